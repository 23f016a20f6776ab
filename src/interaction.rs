//! Pointer-driven interaction state machine.
//!
//! Exactly one gesture is active at a time. A gesture starts on pointer-down,
//! is replaced wholesale on every transition, and ends only on pointer-up.
//! All positions passed in are screen coordinates relative to the canvas.

use crate::editor::NodeEditor;
use crate::events::EditorEvent;
use crate::geometry::Point;
use crate::graph::{validate_connection, PortRef};
use crate::hit_test::{HitTarget, NodeRegion};
use crate::ids::NodeId;
use crate::path::{route, EdgePath};
use crate::selection::PressOutcome;
use std::collections::HashSet;

/// Keyboard modifiers held during a pointer or key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    /// Shift, Ctrl or Cmd: toggles selection instead of replacing it
    pub fn toggle_select(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A connection being dragged out of a port
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDraft {
    pub source: PortRef,
    /// Canvas position of the source port
    pub anchor: Point,
    /// Canvas position of the pointer
    pub pointer: Point,
    /// Port currently under the pointer, other than the source
    pub hover: Option<PortRef>,
}

/// The active pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        /// Screen position at pointer-down
        pointer_origin: Point,
        offset_origin: Point,
    },
    DraggingNodes {
        /// Canvas position at pointer-down
        pointer_origin: Point,
        /// Each dragged node with its position at pointer-down
        origins: Vec<(NodeId, Point)>,
    },
    DraftingEdge(EdgeDraft),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Panning { .. } => "panning",
            InteractionState::DraggingNodes { .. } => "dragging",
            InteractionState::DraftingEdge(_) => "drafting",
        }
    }

    /// True if the gesture holds on to `node` in any way
    pub fn references_node(&self, node: &NodeId) -> bool {
        match self {
            InteractionState::Idle | InteractionState::Panning { .. } => false,
            InteractionState::DraggingNodes { origins, .. } => origins.iter().any(|(id, _)| id == node),
            InteractionState::DraftingEdge(draft) => {
                draft.source.node == *node || draft.hover.as_ref().is_some_and(|h| h.node == *node)
            }
        }
    }
}

impl NodeEditor {
    /// Primary button pressed on the canvas.
    ///
    /// Ignored while another gesture is still active.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        if !self.interaction.is_idle() {
            tracing::trace!(state = self.interaction.name(), "pointer-down ignored");
            return;
        }

        let next = match self.hit_test(screen) {
            HitTarget::Port(port) => self.begin_draft(port, screen),
            HitTarget::Node { id, region } => self.press_node(&id, region, screen, modifiers),
            HitTarget::Edge(id) => {
                if self.selection.select_edge(&id) {
                    self.push_selection_changed();
                }
                InteractionState::Idle
            }
            HitTarget::Background => {
                if self.selection.clear() {
                    self.push_selection_changed();
                }
                InteractionState::Panning {
                    pointer_origin: screen,
                    offset_origin: self.viewport.offset(),
                }
            }
        };

        tracing::trace!(state = next.name(), "pointer-down");
        self.interaction = next;
        self.flush_events();
    }

    /// Pointer moved anywhere; the active gesture keeps tracking it.
    pub fn pointer_move(&mut self, screen: Point) {
        let canvas = self.viewport.screen_to_canvas(screen);
        match &mut self.interaction {
            InteractionState::Idle => {}
            InteractionState::Panning {
                pointer_origin,
                offset_origin,
            } => {
                let offset = *offset_origin + (screen - *pointer_origin);
                self.viewport.set_offset(offset);
            }
            InteractionState::DraggingNodes {
                pointer_origin,
                origins,
            } => {
                let delta = canvas - *pointer_origin;
                let mut moved = HashSet::new();
                for (id, origin) in origins.iter() {
                    if self.graph.set_node_position(id, *origin + delta).is_some() {
                        moved.insert(id.clone());
                    }
                }
                self.reroute_nodes(&moved);
            }
            InteractionState::DraftingEdge(draft) => {
                draft.pointer = canvas;
                let source = draft.source.clone();
                let hover = self.scene().port_at_where(screen, |p| *p != source);
                if let InteractionState::DraftingEdge(draft) = &mut self.interaction {
                    draft.hover = hover;
                }
            }
        }
    }

    /// Primary button released; commits or discards the active gesture.
    pub fn pointer_up(&mut self, screen: Point) {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Idle | InteractionState::Panning { .. } => {}
            InteractionState::DraggingNodes { origins, .. } => {
                for (id, origin) in origins {
                    let Some(position) = self.graph.node(&id).map(|n| n.position) else {
                        continue;
                    };
                    if position != origin {
                        tracing::debug!(node = %id, x = position.x, y = position.y, "node dragged");
                        self.events.push(EditorEvent::NodeMoved {
                            node_id: id,
                            position,
                        });
                    }
                }
            }
            InteractionState::DraftingEdge(draft) => self.commit_draft(&draft.source, screen),
        }
        self.flush_events();
    }

    /// Mouse wheel over the canvas. Negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f32, screen: Point) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y < 0.0 {
            1.0 + self.config.zoom_speed
        } else {
            1.0 - self.config.zoom_speed
        };
        let anchor = if self.config.zoom_to_mouse {
            screen
        } else {
            self.viewport.screen_center()
        };
        self.zoom_at(self.viewport.scale() * factor, anchor);
    }

    /// The in-progress connection, if one is being drafted
    pub fn draft_edge(&self) -> Option<&EdgeDraft> {
        match &self.interaction {
            InteractionState::DraftingEdge(draft) => Some(draft),
            _ => None,
        }
    }

    /// Path of the in-progress connection, routed with the configured style
    pub fn draft_path(&self) -> Option<EdgePath> {
        self.draft_edge()
            .map(|d| route(self.config.edge_style, d.anchor, d.pointer))
    }

    fn begin_draft(&self, source: PortRef, screen: Point) -> InteractionState {
        let canvas = self.viewport.screen_to_canvas(screen);
        let anchor = self
            .graph
            .node(&source.node)
            .and_then(|n| {
                self.geometry
                    .port_position(n, &source.port, &self.config.node_metrics)
            })
            .unwrap_or(canvas);
        InteractionState::DraftingEdge(EdgeDraft {
            source,
            anchor,
            pointer: canvas,
            hover: None,
        })
    }

    fn press_node(
        &mut self,
        id: &NodeId,
        region: NodeRegion,
        screen: Point,
        modifiers: Modifiers,
    ) -> InteractionState {
        let outcome = self.selection.handle_press(id, modifiers.toggle_select());
        let drag: Vec<NodeId> = match outcome {
            PressOutcome::Toggled => {
                self.push_selection_changed();
                return InteractionState::Idle;
            }
            PressOutcome::Selected { changed } => {
                if changed {
                    self.push_selection_changed();
                }
                vec![id.clone()]
            }
            PressOutcome::KeptGroup => self.selected_nodes(),
        };

        if region != NodeRegion::Header {
            return InteractionState::Idle;
        }
        let origins = drag
            .into_iter()
            .filter_map(|n| self.graph.node(&n).map(|node| (n, node.position)))
            .collect();
        InteractionState::DraggingNodes {
            pointer_origin: self.viewport.screen_to_canvas(screen),
            origins,
        }
    }

    fn commit_draft(&mut self, source: &PortRef, screen: Point) {
        let Some(target) = self.scene().port_at(screen) else {
            tracing::trace!("draft released over empty space");
            return;
        };
        let (output, input) =
            match validate_connection(source, &target, &self.graph, self.validator.as_ref()) {
                Ok(pair) => pair,
                Err(reason) => {
                    tracing::debug!(%reason, "draft discarded");
                    return;
                }
            };
        if let Err(err) = self.add_edge_inner(output.node, output.port, input.node, input.port) {
            tracing::debug!(%err, "draft discarded");
        }
    }
}
