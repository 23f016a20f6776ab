//! Background grid: the drawing contract and an SVG implementation.

use crate::editor::NodeEditor;
use crate::geometry::{Point, Size};
use slint::Color;
use std::fmt::Write;

/// Below this on-screen spacing the grid is not drawn
pub const MIN_VISIBLE_SPACING: f32 = 4.0;

/// What a grid surface needs to paint one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    /// Logical spacing between lines
    pub grid_size: f32,
    pub scale: f32,
    /// Pan offset in screen pixels
    pub offset: Point,
    pub color: Color,
}

/// A 2D surface the host draws the background grid on.
pub trait GridSurface {
    fn paint_grid(&mut self, params: &GridParams);

    /// Called instead of `paint_grid` when the grid is hidden
    fn clear_grid(&mut self) {}
}

/// Generate SVG path commands for an infinite grid.
///
/// Lines repeat every `spacing * scale` screen pixels, shifted by the pan
/// offset modulo that spacing. Returns an empty string when the spacing is
/// too small to see.
pub fn generate_grid_commands(size: Size, scale: f32, offset: Point, spacing: f32) -> String {
    let step = spacing * scale;
    if !step.is_finite() || step < MIN_VISIBLE_SPACING {
        return String::new();
    }

    let start_x = offset.x.rem_euclid(step);
    let start_y = offset.y.rem_euclid(step);
    let mut commands = String::new();

    let mut x = start_x;
    while x < size.width + step {
        let _ = write!(commands, "M {} 0 L {} {} ", x, x, size.height);
        x += step;
    }
    let mut y = start_y;
    while y < size.height + step {
        let _ = write!(commands, "M 0 {} L {} {} ", y, size.width, y);
        y += step;
    }

    commands.truncate(commands.trim_end().len());
    commands
}

/// Grid surface that renders to SVG path commands, e.g. for a Slint `Path`.
#[derive(Debug, Clone, Default)]
pub struct SvgGrid {
    size: Size,
    commands: String,
    color: Option<Color>,
}

impl SvgGrid {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Commands from the last paint
    pub fn commands(&self) -> &str {
        &self.commands
    }

    /// Line color from the last paint; `None` while hidden
    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

impl GridSurface for SvgGrid {
    fn paint_grid(&mut self, params: &GridParams) {
        self.commands = generate_grid_commands(self.size, params.scale, params.offset, params.grid_size);
        self.color = Some(params.color);
    }

    fn clear_grid(&mut self) {
        self.commands.clear();
        self.color = None;
    }
}

impl NodeEditor {
    /// Current grid parameters, or `None` when the grid is hidden
    pub fn grid_params(&self) -> Option<GridParams> {
        if !self.config.show_grid {
            return None;
        }
        Some(GridParams {
            grid_size: self.config.grid_size,
            scale: self.viewport.scale(),
            offset: self.viewport.offset(),
            color: self.config.palette().grid,
        })
    }

    /// Paint (or clear) the background grid for the current view
    pub fn paint_grid(&self, surface: &mut dyn GridSurface) {
        match self.grid_params() {
            Some(params) => surface.paint_grid(&params),
            None => surface.clear_grid(),
        }
    }
}
