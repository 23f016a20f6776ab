//! Test harness for a mounted editor.
//!
//! Provides a two-node graph with one edge, event tracking, and helpers for
//! simulating pointer and keyboard input in screen coordinates.

#![allow(dead_code)]

use super::EventTracker;
use node_graph_canvas::{
    EditorConfig, Key, KeyEvent, Modifiers, NodeEditor, NodeId, NodeSpec, Point, PortId, Size,
};
use slint::{Model, SharedString, VecModel};
use std::rc::Rc;
use std::sync::Once;

pub const VIEW_WIDTH: f32 = 1000.0;
pub const VIEW_HEIGHT: f32 = 800.0;

/// One row of the bound edge model: (edge id, SVG path)
pub type EdgeRow = (SharedString, SharedString);

/// Install a fmt subscriber once per test binary.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// A mounted editor with event tracking.
pub struct EditorHarness {
    pub editor: NodeEditor,
    pub tracker: EventTracker,
    pub edge_rows: Rc<VecModel<EdgeRow>>,
    pub selection_rows: Rc<VecModel<SharedString>>,
}

impl EditorHarness {
    /// Node A at (100, 100) with output "out", Node B at (400, 200) with
    /// input "in", and an edge between them. The tracker starts empty.
    pub fn new() -> Self {
        let mut harness = Self::empty();
        harness
            .editor
            .add_node(
                NodeSpec::new("Node A")
                    .with_id("a")
                    .at(100.0, 100.0)
                    .output("out", "Out", "number"),
            )
            .unwrap();
        harness
            .editor
            .add_node(
                NodeSpec::new("Node B")
                    .with_id("b")
                    .at(400.0, 200.0)
                    .input("in", "In", "number"),
            )
            .unwrap();
        harness.editor.add_edge("a", "out", "b", "in").unwrap();
        harness.tracker.clear();
        harness
    }

    /// A mounted editor with no nodes
    pub fn empty() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        init_tracing();
        let mut editor = NodeEditor::with_config(config);
        let tracker = EventTracker::new();
        tracker.attach(&mut editor);

        let edge_rows: Rc<VecModel<EdgeRow>> = Rc::new(VecModel::default());
        editor.bind_edge_model(edge_rows.clone(), |id, svg| (id, svg));

        editor.mount(Size::new(VIEW_WIDTH, VIEW_HEIGHT));
        tracker.clear();
        Self {
            editor,
            tracker,
            edge_rows,
            selection_rows: Rc::new(VecModel::default()),
        }
    }

    // === Geometry helpers ===

    pub fn node_position(&self, id: &str) -> Point {
        self.editor.node(&NodeId::from(id)).unwrap().position
    }

    /// Screen position of a port anchor
    pub fn port_screen(&self, node: &str, port: &str) -> Point {
        let n = self.editor.node(&NodeId::from(node)).unwrap();
        let canvas = self
            .editor
            .geometry()
            .port_position(n, &PortId::from(port), &self.editor.config().node_metrics)
            .unwrap();
        self.editor.canvas_to_screen(canvas)
    }

    /// Screen point inside a node's header strip
    pub fn header_screen(&self, node: &str) -> Point {
        let p = self.node_position(node);
        self.editor.canvas_to_screen(p + Point::new(40.0, 10.0))
    }

    /// Screen point inside a node's body, below the header
    pub fn body_screen(&self, node: &str) -> Point {
        let metrics = &self.editor.config().node_metrics;
        let p = self.node_position(node);
        self.editor
            .canvas_to_screen(p + Point::new(40.0, metrics.header_height + 4.0))
    }

    /// Screen midpoint of the routed path of the first edge
    pub fn edge_midpoint_screen(&self) -> Point {
        let (_, path) = self.editor.edge_paths().next().unwrap();
        let mid = match path {
            node_graph_canvas::EdgePath::Cubic(c) => c.eval(0.5),
            other => other.start().lerp(other.end(), 0.5),
        };
        self.editor.canvas_to_screen(mid)
    }

    /// Ids of the rows currently in the bound edge model
    pub fn edge_row_ids(&self) -> Vec<String> {
        (0..self.edge_rows.row_count())
            .filter_map(|i| self.edge_rows.row_data(i))
            .map(|(id, _)| id.to_string())
            .collect()
    }

    pub fn sync_selection(&self) {
        self.editor.selection().sync_to_model(&self.selection_rows);
    }

    // === Mouse event helpers ===

    pub fn mouse_down(&mut self, at: Point) {
        self.editor.pointer_down(at, Modifiers::NONE);
    }

    pub fn mouse_down_with(&mut self, at: Point, modifiers: Modifiers) {
        self.editor.pointer_down(at, modifiers);
    }

    pub fn mouse_move(&mut self, at: Point) {
        self.editor.pointer_move(at);
    }

    pub fn mouse_up(&mut self, at: Point) {
        self.editor.pointer_up(at);
    }

    /// Simulate a complete click (down + up) at the given position.
    pub fn click(&mut self, at: Point) {
        self.mouse_down(at);
        self.mouse_up(at);
    }

    pub fn click_with(&mut self, at: Point, modifiers: Modifiers) {
        self.mouse_down_with(at, modifiers);
        self.mouse_up(at);
    }

    /// Simulate a complete drag from start to end.
    pub fn drag(&mut self, from: Point, to: Point) {
        self.mouse_down(from);
        self.mouse_move(to);
        self.mouse_up(to);
    }

    /// Simulate a wheel tick; negative zooms in
    pub fn scroll(&mut self, at: Point, delta_y: f32) {
        self.editor.wheel(delta_y, at);
    }

    // === Keyboard event helpers ===

    pub fn key_tap(&mut self, key: Key) -> bool {
        self.editor.handle_key(key)
    }

    pub fn key_tap_with(&mut self, key: Key, modifiers: Modifiers) -> bool {
        self.editor.handle_key(KeyEvent::new(key, modifiers))
    }
}

impl Default for EditorHarness {
    fn default() -> Self {
        Self::new()
    }
}
