//! Editor configuration and partial-merge patches.

use crate::error::Result;
use crate::path::EdgeStyle;
use crate::state::NodeMetrics;
use crate::viewport::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use serde::{Deserialize, Serialize};
use slint::Color;

/// Color scheme. Affects default colors only, never behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Default colors a renderer reads for the given theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub edge: Color,
    pub edge_selected: Color,
    pub draft_edge: Color,
    pub node_accent: Color,
    pub port_hover: Color,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::from_rgb_u8(30, 30, 36),
                grid: Color::from_rgb_u8(48, 48, 56),
                edge: Color::from_rgb_u8(140, 150, 170),
                edge_selected: Color::from_rgb_u8(255, 180, 60),
                draft_edge: Color::from_rgb_u8(100, 180, 255),
                node_accent: Color::from_rgb_u8(70, 110, 200),
                port_hover: Color::from_rgb_u8(120, 220, 140),
            },
            Theme::Light => Palette {
                background: Color::from_rgb_u8(246, 246, 248),
                grid: Color::from_rgb_u8(222, 222, 228),
                edge: Color::from_rgb_u8(110, 116, 130),
                edge_selected: Color::from_rgb_u8(230, 130, 20),
                draft_edge: Color::from_rgb_u8(40, 120, 220),
                node_accent: Color::from_rgb_u8(60, 100, 190),
                port_hover: Color::from_rgb_u8(40, 170, 80),
            },
        }
    }
}

/// Full editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Reserved; edge commit is a pure port hit-test
    pub snap_radius: f32,
    pub grid_size: f32,
    pub show_grid: bool,
    pub edge_style: EdgeStyle,
    pub theme: Theme,
    /// Fractional scale step per wheel tick
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Anchor wheel zoom at the pointer instead of the viewport center
    pub zoom_to_mouse: bool,
    pub enable_keyboard_shortcuts: bool,
    pub node_metrics: NodeMetrics,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_radius: 20.0,
            grid_size: 20.0,
            show_grid: true,
            edge_style: EdgeStyle::Bezier,
            theme: Theme::Dark,
            zoom_speed: 0.1,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_to_mouse: true,
            enable_keyboard_shortcuts: true,
            node_metrics: NodeMetrics::default(),
        }
    }
}

/// A partial configuration; `None` fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_to_mouse: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_keyboard_shortcuts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_metrics: Option<NodeMetrics>,
}

impl ConfigPatch {
    /// Parse a patch from a JSON object such as `{"minZoom": 0.5}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Which derived state must be refreshed after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    pub zoom_bounds: bool,
    pub routing: bool,
    pub grid: bool,
}

impl ConfigChanges {
    pub fn any(&self) -> bool {
        self.zoom_bounds || self.routing || self.grid
    }
}

impl EditorConfig {
    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    /// Merge a patch. Invalid values are ignored with a warning; zoom bounds
    /// given in the wrong order are swapped.
    pub fn apply(&mut self, patch: &ConfigPatch) -> ConfigChanges {
        let mut changes = ConfigChanges::default();

        if let Some(r) = patch.snap_radius {
            self.snap_radius = r;
        }
        if let Some(size) = patch.grid_size {
            if size.is_finite() && size > 0.0 {
                changes.grid |= size != self.grid_size;
                self.grid_size = size;
            } else {
                tracing::warn!(size, "ignoring non-positive grid size");
            }
        }
        if let Some(show) = patch.show_grid {
            changes.grid |= show != self.show_grid;
            self.show_grid = show;
        }
        if let Some(style) = patch.edge_style {
            changes.routing |= style != self.edge_style;
            self.edge_style = style;
        }
        if let Some(theme) = patch.theme {
            changes.grid |= theme != self.theme;
            self.theme = theme;
        }
        if let Some(speed) = patch.zoom_speed {
            if speed.is_finite() && speed > 0.0 && speed < 1.0 {
                self.zoom_speed = speed;
            } else {
                tracing::warn!(speed, "ignoring zoom speed outside (0, 1)");
            }
        }
        if patch.min_zoom.is_some() || patch.max_zoom.is_some() {
            let min = patch.min_zoom.unwrap_or(self.min_zoom);
            let max = patch.max_zoom.unwrap_or(self.max_zoom);
            if valid_zoom(min) && valid_zoom(max) {
                let (min, max) = if min <= max {
                    (min, max)
                } else {
                    tracing::warn!(min, max, "zoom bounds reversed; swapping");
                    (max, min)
                };
                changes.zoom_bounds = min != self.min_zoom || max != self.max_zoom;
                self.min_zoom = min;
                self.max_zoom = max;
            } else {
                tracing::warn!(min, max, "ignoring non-positive zoom bounds");
            }
        }
        if let Some(z) = patch.zoom_to_mouse {
            self.zoom_to_mouse = z;
        }
        if let Some(k) = patch.enable_keyboard_shortcuts {
            self.enable_keyboard_shortcuts = k;
        }
        if let Some(metrics) = patch.node_metrics {
            changes.routing |= metrics != self.node_metrics;
            self.node_metrics = metrics;
        }

        changes
    }
}

fn valid_zoom(z: f32) -> bool {
    z.is_finite() && z > 0.0
}
