//! Edge routing: pure functions from two logical points and a style to a path.
//!
//! Routing happens in canvas coordinates. Pan and zoom never require a
//! re-route since the view transform applies uniformly to the edge layer.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Upper bound on the horizontal control-point offset of a bezier edge
pub const MAX_CONTROL_OFFSET: f32 = 150.0;

/// Curve samples used for bezier distance queries
pub const DEFAULT_SAMPLES: usize = 20;

/// Visual style used to route every edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    #[default]
    Bezier,
    Straight,
    Step,
}

/// Cubic bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// Curve with horizontal tangents at both ends.
    ///
    /// Control points extend right from `start` and left from `end` by
    /// `min(|dx| * 0.5, MAX_CONTROL_OFFSET)`.
    pub fn horizontal(start: Point, end: Point) -> Self {
        let offset = ((end.x - start.x).abs() * 0.5).min(MAX_CONTROL_OFFSET);
        CubicBezier {
            p0: start,
            p1: Point::new(start.x + offset, start.y),
            p2: Point::new(end.x - offset, end.y),
            p3: end,
        }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }
}

/// A routed edge in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgePath {
    Line { start: Point, end: Point },
    /// start, (midX, startY), (midX, endY), end
    Step([Point; 4]),
    Cubic(CubicBezier),
}

impl EdgePath {
    pub fn start(&self) -> Point {
        match self {
            EdgePath::Line { start, .. } => *start,
            EdgePath::Step(pts) => pts[0],
            EdgePath::Cubic(c) => c.p0,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            EdgePath::Line { end, .. } => *end,
            EdgePath::Step(pts) => pts[3],
            EdgePath::Cubic(c) => c.p3,
        }
    }

    /// SVG path command string (e.g. "M 10 20 C 60 20 90 80 140 80")
    pub fn to_svg(&self) -> String {
        match self {
            EdgePath::Line { start, end } => {
                format!("M {} {} L {} {}", start.x, start.y, end.x, end.y)
            }
            EdgePath::Step([a, b, c, d]) => format!(
                "M {} {} L {} {} L {} {} L {} {}",
                a.x, a.y, b.x, b.y, c.x, c.y, d.x, d.y
            ),
            EdgePath::Cubic(c) => format!(
                "M {} {} C {} {} {} {} {} {}",
                c.p0.x, c.p0.y, c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y
            ),
        }
    }

    /// Minimum distance from `point` to the path
    pub fn distance_to(&self, point: Point) -> f32 {
        match self {
            EdgePath::Line { start, end } => distance_to_segment_sq(point, *start, *end).sqrt(),
            EdgePath::Step(pts) => pts
                .windows(2)
                .map(|w| distance_to_segment_sq(point, w[0], w[1]))
                .fold(f32::MAX, f32::min)
                .sqrt(),
            EdgePath::Cubic(c) => distance_to_bezier(point, c, DEFAULT_SAMPLES),
        }
    }
}

/// Route an edge from `start` to `end` in the given style.
pub fn route(style: EdgeStyle, start: Point, end: Point) -> EdgePath {
    match style {
        EdgeStyle::Straight => EdgePath::Line { start, end },
        EdgeStyle::Step => {
            let mid_x = (start.x + end.x) / 2.0;
            EdgePath::Step([
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ])
        }
        EdgeStyle::Bezier => EdgePath::Cubic(CubicBezier::horizontal(start, end)),
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_segment_sq(point: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.x * ap.x + ap.y * ap.y;
    }

    // Project onto the line, clamped to the segment
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    point.distance_sq(a + ab * t)
}

/// Minimum distance from a point to a cubic bezier curve.
///
/// Samples the curve at regular intervals and measures against the resulting
/// polyline. Zero samples falls back to [`DEFAULT_SAMPLES`].
pub fn distance_to_bezier(point: Point, bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 {
        DEFAULT_SAMPLES
    } else {
        num_samples
    };

    let mut min_dist_sq = f32::MAX;
    let mut prev = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr = bezier.eval(t);
        min_dist_sq = min_dist_sq.min(distance_to_segment_sq(point, prev, curr));
        prev = curr;
    }

    min_dist_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    // ========================================================================
    // route() - Styles
    // ========================================================================

    #[test]
    fn test_straight_route() {
        let path = route(EdgeStyle::Straight, p(0.0, 0.0), p(100.0, 50.0));
        assert_eq!(path.to_svg(), "M 0 0 L 100 50");
    }

    #[test]
    fn test_step_route_goes_through_mid_x() {
        let path = route(EdgeStyle::Step, p(0.0, 10.0), p(100.0, 90.0));
        match &path {
            EdgePath::Step(pts) => {
                assert_eq!(pts[1], p(50.0, 10.0));
                assert_eq!(pts[2], p(50.0, 90.0));
            }
            other => panic!("expected step path, got {:?}", other),
        }
        assert_eq!(path.to_svg(), "M 0 10 L 50 10 L 50 90 L 100 90");
    }

    #[test]
    fn test_bezier_is_default_style() {
        assert_eq!(EdgeStyle::default(), EdgeStyle::Bezier);
        let path = route(EdgeStyle::default(), p(10.0, 20.0), p(100.0, 80.0));
        assert!(path.to_svg().starts_with("M 10 20 C"));
        assert!(path.to_svg().ends_with("100 80"));
    }

    #[test]
    fn test_style_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EdgeStyle::Step).unwrap(), "\"step\"");
        let s: EdgeStyle = serde_json::from_str("\"straight\"").unwrap();
        assert_eq!(s, EdgeStyle::Straight);
    }

    // ========================================================================
    // CubicBezier::horizontal() - Control points
    // ========================================================================

    #[test]
    fn test_bezier_control_points_are_horizontal() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(100.0, 100.0));
        assert_eq!(c.p1, p(50.0, 0.0));
        assert_eq!(c.p2, p(50.0, 100.0));
    }

    #[test]
    fn test_bezier_offset_is_capped() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(1000.0, 0.0));
        assert_eq!(c.p1.x, MAX_CONTROL_OFFSET);
        assert_eq!(c.p2.x, 1000.0 - MAX_CONTROL_OFFSET);
    }

    #[test]
    fn test_bezier_offset_uses_abs_dx_for_backward_edges() {
        // Target left of source still bulges out to the right of the source
        let c = CubicBezier::horizontal(p(200.0, 0.0), p(0.0, 50.0));
        assert_eq!(c.p1, p(300.0, 0.0));
        assert_eq!(c.p2, p(-100.0, 50.0));
    }

    // ========================================================================
    // CubicBezier::eval()
    // ========================================================================

    #[test]
    fn test_bezier_eval_endpoints() {
        let c = CubicBezier::horizontal(p(10.0, 20.0), p(100.0, 80.0));
        assert!(c.eval(0.0).approx_eq(p(10.0, 20.0), 0.001));
        assert!(c.eval(1.0).approx_eq(p(100.0, 80.0), 0.001));
    }

    #[test]
    fn test_bezier_symmetry() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(100.0, 0.0));
        let left = c.eval(0.25);
        let right = c.eval(0.75);
        assert!((left.y - right.y).abs() < 0.001);
        assert!((left.x + right.x - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_bezier_monotonic_x_for_horizontal() {
        let c = CubicBezier::horizontal(p(0.0, 50.0), p(100.0, 50.0));
        let mut prev_x = c.eval(0.0).x;
        for i in 1..=20 {
            let t = i as f32 / 20.0;
            let x = c.eval(t).x;
            assert!(x >= prev_x - 0.001, "x not monotonic at t={}", t);
            prev_x = x;
        }
    }

    // ========================================================================
    // Distance
    // ========================================================================

    #[test]
    fn test_distance_to_bezier_on_curve() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(100.0, 0.0));
        assert!(distance_to_bezier(p(0.0, 0.0), &c, 20) < 1.0);
        assert!(distance_to_bezier(p(100.0, 0.0), &c, 20) < 1.0);
    }

    #[test]
    fn test_distance_to_bezier_near_and_far() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(100.0, 0.0));
        let near = distance_to_bezier(p(50.0, 5.0), &c, 20);
        assert!(near > 4.0 && near < 6.0);
        assert!(distance_to_bezier(p(50.0, 100.0), &c, 20) > 90.0);
    }

    #[test]
    fn test_distance_to_bezier_zero_samples_uses_default() {
        let c = CubicBezier::horizontal(p(0.0, 0.0), p(100.0, 0.0));
        let d = distance_to_bezier(p(50.0, 10.0), &c, 0);
        assert!(d.is_finite());
        assert!(d >= 0.0);
    }

    #[test]
    fn test_distance_to_step_path() {
        let path = route(EdgeStyle::Step, p(0.0, 0.0), p(100.0, 100.0));
        // Point on the vertical middle segment
        assert!(path.distance_to(p(50.0, 50.0)) < 0.001);
        // 10 units right of the vertical segment
        assert!((path.distance_to(p(60.0, 50.0)) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_distance_to_degenerate_line() {
        let path = route(EdgeStyle::Straight, p(5.0, 5.0), p(5.0, 5.0));
        assert!((path.distance_to(p(8.0, 9.0)) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_path_start_end() {
        for style in [EdgeStyle::Bezier, EdgeStyle::Straight, EdgeStyle::Step] {
            let path = route(style, p(1.0, 2.0), p(3.0, 4.0));
            assert_eq!(path.start(), p(1.0, 2.0));
            assert_eq!(path.end(), p(3.0, 4.0));
        }
    }
}
