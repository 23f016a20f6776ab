//! Fit-to-view, centering and scroll-into-view.

use crate::editor::NodeEditor;
use crate::events::EditorEvent;
use crate::geometry::{Point, Rect, Size};
use crate::graph::Graph;
use crate::ids::NodeId;
use crate::state::{GeometryCache, NodeMetrics};

/// Logical padding around the bounding box when fitting
pub const FIT_PADDING: f32 = 50.0;

/// Screen-pixel margin kept around a node scrolled into view
pub const SCROLL_MARGIN: f32 = 50.0;

/// Bounding box of every node rectangle, or `None` for an empty graph
pub fn bounding_box(graph: &Graph, geometry: &GeometryCache, metrics: &NodeMetrics) -> Option<Rect> {
    graph
        .nodes()
        .iter()
        .map(|n| geometry.node_rect(n, metrics))
        .reduce(|a, b| a.union(&b))
}

/// Scale and offset that show `bounds` (plus padding) centered in a view of
/// `view` screen pixels.
///
/// The scale never exceeds 1.0 and is clamped to `[min_zoom, max_zoom]`.
pub fn fit_transform(bounds: Rect, view: Size, padding: f32, min_zoom: f32, max_zoom: f32) -> (f32, Point) {
    let padded = bounds.inflate(padding);
    let scale = if view.width <= 0.0 || view.height <= 0.0 {
        1.0
    } else {
        let sx = view.width / padded.width.max(f32::EPSILON);
        let sy = view.height / padded.height.max(f32::EPSILON);
        sx.min(sy).min(1.0)
    };
    let scale = scale.clamp(min_zoom, max_zoom);
    let center = Point::new(view.width / 2.0, view.height / 2.0);
    (scale, center - padded.center() * scale)
}

/// Screen-space pan that brings `rect` inside the view with `margin` pixels to
/// spare. Oversized rectangles align to the top-left margin.
pub fn scroll_delta(rect: Rect, view: Size, margin: f32) -> Point {
    fn axis(start: f32, len: f32, view: f32, margin: f32) -> f32 {
        if start < margin {
            margin - start
        } else if start + len > view - margin {
            ((view - margin) - (start + len)).max(margin - start)
        } else {
            0.0
        }
    }
    Point::new(
        axis(rect.x, rect.width, view.width, margin),
        axis(rect.y, rect.height, view.height, margin),
    )
}

impl NodeEditor {
    /// Scale and center the view around every node.
    ///
    /// With no nodes this is [`center_view`](Self::center_view).
    pub fn fit_to_view(&mut self) {
        let metrics = &self.config.node_metrics;
        let Some(bounds) = bounding_box(&self.graph, &self.geometry, metrics) else {
            self.center_view();
            return;
        };
        let before = self.viewport.scale();
        let (scale, offset) = fit_transform(
            bounds,
            self.viewport.size(),
            FIT_PADDING,
            self.viewport.min_zoom(),
            self.viewport.max_zoom(),
        );
        let scale = self.viewport.set_zoom(scale);
        self.viewport.set_offset(offset);
        tracing::debug!(scale, x = offset.x, y = offset.y, "fit to view");
        if scale != before {
            self.events.push(EditorEvent::ZoomChanged { scale });
        }
        self.flush_events();
    }

    /// Zero the offset and reset the scale to 1
    pub fn center_view(&mut self) {
        let before = self.viewport.scale();
        self.viewport.reset();
        let scale = self.viewport.scale();
        if scale != before {
            self.events.push(EditorEvent::ZoomChanged { scale });
        }
        self.flush_events();
    }

    /// Canvas point currently at the center of the view
    pub fn get_center(&self) -> Point {
        self.viewport.canvas_center()
    }

    /// Pan so the node sits inside the view with a margin.
    ///
    /// Returns true if the view moved.
    pub fn scroll_into_view(&mut self, id: &NodeId) -> bool {
        let view = self.viewport.size();
        if view.width <= 0.0 || view.height <= 0.0 {
            return false;
        }
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        let rect = self.geometry.node_rect(node, &self.config.node_metrics);
        let origin = self.viewport.canvas_to_screen(rect.origin());
        let scale = self.viewport.scale();
        let on_screen = Rect::new(origin.x, origin.y, rect.width * scale, rect.height * scale);

        let delta = scroll_delta(on_screen, view, SCROLL_MARGIN);
        if delta == Point::ZERO {
            return false;
        }
        self.viewport.pan(delta.x, delta.y);
        true
    }
}
