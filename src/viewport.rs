//! Pan/zoom transform between screen and canvas coordinates.
//!
//! The transform is `screen = canvas * scale + offset`. `offset` is in screen
//! pixels; `scale` is clamped to `[min_zoom, max_zoom]` on every write.

use crate::geometry::{Point, Size};

/// Default lower zoom bound
pub const DEFAULT_MIN_ZOOM: f32 = 0.1;
/// Default upper zoom bound
pub const DEFAULT_MAX_ZOOM: f32 = 4.0;

/// View transform state for one editor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset: Point,
    scale: f32,
    min_zoom: f32,
    max_zoom: f32,
    size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl Viewport {
    /// Create an identity transform with the given zoom bounds.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        let (min_zoom, max_zoom) = ordered_bounds(min_zoom, max_zoom);
        Self {
            offset: Point::ZERO,
            scale: 1.0_f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            size: Size::default(),
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Size of the visible canvas element in screen pixels
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Clamp a requested scale into the configured bounds.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.scale;
        }
        scale.clamp(self.min_zoom, self.max_zoom)
    }

    /// Replace the zoom bounds and re-clamp the current scale.
    ///
    /// Returns true if the stored scale changed as a result.
    pub fn set_zoom_bounds(&mut self, min_zoom: f32, max_zoom: f32) -> bool {
        let (min_zoom, max_zoom) = ordered_bounds(min_zoom, max_zoom);
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        let clamped = self.clamp_scale(self.scale);
        let changed = clamped != self.scale;
        self.scale = clamped;
        changed
    }

    /// `(screen - offset) / scale`
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.offset) / self.scale
    }

    /// `canvas * scale + offset`
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas * self.scale + self.offset
    }

    /// Set the scale (clamped) without moving the offset.
    ///
    /// Returns the scale actually stored.
    pub fn set_zoom(&mut self, scale: f32) -> f32 {
        self.scale = self.clamp_scale(scale);
        self.scale
    }

    /// Zoom so that the canvas point under `screen` stays under `screen`.
    ///
    /// Returns the scale actually stored.
    pub fn zoom_to_point(&mut self, scale: f32, screen: Point) -> f32 {
        let new_scale = self.clamp_scale(scale);
        // Convert the anchor to canvas space with the pre-change transform
        let anchor = self.screen_to_canvas(screen);
        self.scale = new_scale;
        self.offset = screen - anchor * new_scale;
        new_scale
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset += Point::new(dx, dy);
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Zero offset, scale 1 (clamped).
    pub fn reset(&mut self) {
        self.offset = Point::ZERO;
        self.scale = self.clamp_scale(1.0);
    }

    /// Center of the visible area in screen coordinates
    pub fn screen_center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Canvas point currently shown at the center of the visible area
    pub fn canvas_center(&self) -> Point {
        self.screen_to_canvas(self.screen_center())
    }
}

fn ordered_bounds(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
