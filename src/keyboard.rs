//! Keyboard shortcuts.
//!
//! Key events are first resolved to a [`KeyCommand`] by a pure lookup, then
//! executed against the editor. Nothing happens while shortcuts are disabled
//! or a text input inside the canvas has focus.

use crate::editor::NodeEditor;
use crate::events::EditorEvent;
use crate::geometry::Point;
use crate::ids::NodeId;
use crate::interaction::Modifiers;
use std::collections::HashSet;

/// Logical units a selected node moves per arrow press
pub const NUDGE_STEP: f32 = 10.0;
/// Screen pixels the view pans per arrow press
pub const PAN_STEP: f32 = 20.0;
pub const PAN_STEP_LARGE: f32 = 50.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Tab,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Where keyboard focus is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    Canvas,
    /// A text field inside a node; shortcuts are suppressed
    TextInput,
}

/// Editor action bound to a key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    DeleteSelected,
    /// Move selected nodes by a logical delta
    MoveSelected(Point),
    /// Pan the view by a screen delta
    Pan(Point),
    ZoomBy(f32),
    ZoomReset,
    FitToView,
    SelectNext,
    SelectPrevious,
    SelectAll,
    ClearSelection,
}

/// Map a key press to a command.
///
/// Arrow keys move the node selection when there is one and no Ctrl/Cmd is
/// held; otherwise they pan.
pub fn resolve(event: &KeyEvent, has_node_selection: bool) -> Option<KeyCommand> {
    let m = event.modifiers;
    let arrow = |dx: f32, dy: f32| {
        if has_node_selection && !m.command() {
            KeyCommand::MoveSelected(Point::new(dx * NUDGE_STEP, dy * NUDGE_STEP))
        } else {
            let step = if m.shift { PAN_STEP_LARGE } else { PAN_STEP };
            // The view moves toward the arrow, so content slides the other way
            KeyCommand::Pan(Point::new(-dx * step, -dy * step))
        }
    };

    let command = match event.key {
        Key::Delete | Key::Backspace => KeyCommand::DeleteSelected,
        Key::ArrowLeft => arrow(-1.0, 0.0),
        Key::ArrowRight => arrow(1.0, 0.0),
        Key::ArrowUp => arrow(0.0, -1.0),
        Key::ArrowDown => arrow(0.0, 1.0),
        Key::Tab if m.shift => KeyCommand::SelectPrevious,
        Key::Tab => KeyCommand::SelectNext,
        Key::Escape => KeyCommand::ClearSelection,
        Key::Char(c) => match c {
            '+' | '=' => KeyCommand::ZoomBy(ZOOM_IN_FACTOR),
            '-' | '_' => KeyCommand::ZoomBy(ZOOM_OUT_FACTOR),
            '0' => KeyCommand::ZoomReset,
            'a' | 'A' if m.command() => KeyCommand::SelectAll,
            'f' | 'F' if !m.command() && !m.alt && !m.shift => KeyCommand::FitToView,
            _ => return None,
        },
    };
    Some(command)
}

impl NodeEditor {
    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    /// Tell the editor whether a text input inside the canvas has focus
    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    /// Handle a key press. Returns true if it was consumed.
    pub fn handle_key(&mut self, event: impl Into<KeyEvent>) -> bool {
        if !self.config.enable_keyboard_shortcuts || self.focus == FocusTarget::TextInput {
            return false;
        }
        let event = event.into();
        let Some(command) = resolve(&event, self.selection.node_count() > 0) else {
            return false;
        };
        tracing::trace!(?command, "key command");
        self.run_key_command(command);
        true
    }

    fn run_key_command(&mut self, command: KeyCommand) {
        let center = self.viewport.screen_center();
        match command {
            KeyCommand::DeleteSelected => self.delete_selected(),
            KeyCommand::MoveSelected(delta) => self.nudge_selected(delta),
            KeyCommand::Pan(delta) => self.pan_by(delta.x, delta.y),
            KeyCommand::ZoomBy(factor) => {
                self.zoom_at(self.viewport.scale() * factor, center);
            }
            KeyCommand::ZoomReset => {
                self.zoom_at(1.0, center);
            }
            KeyCommand::FitToView => self.fit_to_view(),
            KeyCommand::SelectNext => self.cycle_selection(true),
            KeyCommand::SelectPrevious => self.cycle_selection(false),
            KeyCommand::SelectAll => self.select_all(),
            KeyCommand::ClearSelection => self.clear_selection(),
        }
    }

    fn nudge_selected(&mut self, delta: Point) {
        let selected = self.selected_nodes();
        let mut moved = HashSet::new();
        for id in selected {
            let Some(position) = self.graph.node(&id).map(|n| n.position + delta) else {
                continue;
            };
            self.graph.set_node_position(&id, position);
            self.events.push(EditorEvent::NodeMoved {
                node_id: id.clone(),
                position,
            });
            moved.insert(id);
        }
        self.reroute_nodes(&moved);
        self.flush_events();
    }

    /// Select the next (or previous) node in insertion order, wrapping
    fn cycle_selection(&mut self, forward: bool) {
        let nodes = self.graph.nodes();
        if nodes.is_empty() {
            return;
        }
        let selected = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| self.selection.contains_node(&n.id))
            .map(|(i, _)| i);
        let last = nodes.len() - 1;
        let index = if forward {
            selected.max().map_or(0, |i| if i == last { 0 } else { i + 1 })
        } else {
            selected.min().map_or(last, |i| if i == 0 { last } else { i - 1 })
        };
        let id: NodeId = nodes[index].id.clone();

        if self.selection.select_node(&id) {
            self.push_selection_changed();
        }
        self.scroll_into_view(&id);
        self.flush_events();
    }
}
