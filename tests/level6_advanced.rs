//! Level 6: Advanced Feature Tests
//!
//! Tests zoom bounds, fit and centering, JSON interchange, graph clearing,
//! reentrant listeners, configuration patches, the grid surface and id
//! generation.

mod common;

use common::harness::{EditorHarness, VIEW_HEIGHT, VIEW_WIDTH};
use common::EventTracker;
use node_graph_canvas::{
    ConfigPatch, EditorError, EditorEvent, GraphData, GridSurface, NodeEditor, NodeId, NodeSpec,
    Point, Size, SvgGrid, Theme, UuidIds,
};
use serde_json::json;
use slint::Model;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ============================================================================
// Zoom Tests
// ============================================================================

#[test]
fn test_zoom_clamps_to_configured_bounds() {
    let mut harness = EditorHarness::new();
    harness.editor.set_config(&ConfigPatch {
        min_zoom: Some(0.5),
        max_zoom: Some(2.0),
        ..Default::default()
    });

    assert_eq!(harness.editor.set_zoom(10.0), 2.0);
    assert_eq!(harness.editor.scale(), 2.0);
    assert_eq!(harness.editor.set_zoom(0.01), 0.5);
    assert_eq!(harness.editor.scale(), 0.5);

    // Events carry the clamped value, not the request
    assert_eq!(
        harness.tracker.events(),
        vec![
            EditorEvent::ZoomChanged { scale: 2.0 },
            EditorEvent::ZoomChanged { scale: 0.5 },
        ]
    );
}

#[test]
fn test_set_zoom_keeps_offset() {
    let mut harness = EditorHarness::new();
    harness.editor.pan_by(30.0, -10.0);
    harness.editor.set_zoom(1.5);
    assert_eq!(harness.editor.offset(), Point::new(30.0, -10.0));
}

#[test]
fn test_zoom_at_anchors_canvas_point() {
    let mut harness = EditorHarness::new();
    harness.editor.pan_by(-120.0, 45.0);
    let anchor = Point::new(321.0, 123.0);
    let before = harness.editor.screen_to_canvas(anchor);
    harness.editor.zoom_at(2.7, anchor);
    let after = harness.editor.screen_to_canvas(anchor);
    assert!(before.approx_eq(after, 1e-3), "{before:?} vs {after:?}");
}

#[test]
fn test_narrowing_bounds_reclamps_scale() {
    let mut harness = EditorHarness::new();
    harness.editor.set_zoom(3.0);
    harness.tracker.clear();

    let patch = ConfigPatch::from_json(r#"{ "maxZoom": 2 }"#).unwrap();
    harness.editor.set_config(&patch);

    assert_eq!(harness.editor.scale(), 2.0);
    assert_eq!(harness.tracker.events(), vec![EditorEvent::ZoomChanged { scale: 2.0 }]);
}

// ============================================================================
// Fit / center
// ============================================================================

#[test]
fn test_fit_empty_graph_resets_view() {
    let mut harness = EditorHarness::empty();
    harness.editor.pan_by(99.0, -42.0);
    harness.editor.set_zoom(0.3);
    harness.tracker.clear();

    harness.editor.fit_to_view();

    assert_eq!(harness.editor.offset(), Point::ZERO);
    assert_eq!(harness.editor.scale(), 1.0);
    assert_eq!(harness.tracker.events(), vec![EditorEvent::ZoomChanged { scale: 1.0 }]);
}

#[test]
fn test_fit_never_magnifies() {
    let mut harness = EditorHarness::empty();
    harness
        .editor
        .add_node(NodeSpec::new("tiny").at(10.0, 10.0))
        .unwrap();
    harness.editor.set_zoom(0.2);
    harness.editor.fit_to_view();
    assert_eq!(harness.editor.scale(), 1.0);
}

#[test]
fn test_fit_large_graph_shows_everything() {
    let mut harness = EditorHarness::empty();
    for i in 0..5 {
        harness
            .editor
            .add_node(NodeSpec::new(format!("n{i}")).at(i as f32 * 1000.0, i as f32 * 600.0))
            .unwrap();
    }
    harness.editor.fit_to_view();
    let scale = harness.editor.scale();
    assert!(scale < 1.0);

    for node in harness.editor.nodes() {
        let p = harness.editor.canvas_to_screen(node.position);
        assert!(p.x >= 0.0 && p.x <= VIEW_WIDTH, "{p:?}");
        assert!(p.y >= 0.0 && p.y <= VIEW_HEIGHT, "{p:?}");
    }
}

#[test]
fn test_center_view() {
    let mut harness = EditorHarness::new();
    harness.editor.pan_by(10.0, 10.0);
    harness.editor.set_zoom(2.5);
    harness.editor.center_view();
    assert_eq!(harness.editor.offset(), Point::ZERO);
    assert_eq!(harness.editor.scale(), 1.0);
    assert_eq!(
        harness.editor.get_center(),
        Point::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0)
    );
}

#[test]
fn test_default_node_position_is_view_center() {
    let mut harness = EditorHarness::empty();
    harness.editor.pan_by(-200.0, -100.0);
    let id = harness.editor.add_node(NodeSpec::new("centered")).unwrap();
    let node = harness.editor.node(&id).unwrap();
    let size = harness.editor.config().node_metrics.estimate_size(0, 0);
    let center = node.position + Point::new(size.width / 2.0, size.height / 2.0);
    assert_eq!(center, harness.editor.get_center());
}

// ============================================================================
// Interchange
// ============================================================================

#[test]
fn test_export_shape() {
    let harness = EditorHarness::new();
    let value: serde_json::Value =
        serde_json::from_str(&harness.editor.export_json().unwrap()).unwrap();
    assert_eq!(
        value["edges"][0],
        json!({ "id": "edge-1", "source": "a", "target": "b", "sourcePort": "out", "targetPort": "in" })
    );
    assert_eq!(value["nodes"][0]["outputs"][0], json!({ "id": "out", "label": "Out", "type": "number" }));
    assert!(value.get("offset").is_none());
}

#[test]
fn test_round_trip_reproduces_graph() {
    let mut source = EditorHarness::new();
    source
        .editor
        .update_node_content(&NodeId::from("a"), Some("<p>hi</p>".into()))
        .unwrap();
    source
        .editor
        .add_node(NodeSpec::new("Tinted").with_id("t").at(-5.5, 7.25).color("#336699"))
        .unwrap();
    let exported = source.editor.export_graph();

    let mut target = EditorHarness::new();
    target.editor.import_graph(&exported).unwrap();

    assert_eq!(target.editor.nodes(), source.editor.nodes());
    assert_eq!(target.editor.edges(), source.editor.edges());
    assert_eq!(target.editor.export_graph(), exported);
}

#[test]
fn test_import_replays_events_in_order() {
    let mut harness = EditorHarness::new();
    harness.editor.select_node(&NodeId::from("a")).unwrap();
    harness.tracker.clear();

    let data = harness.editor.export_graph();
    harness.editor.import_graph(&data).unwrap();

    assert_eq!(
        harness.tracker.names(),
        vec![
            "edge-removed",
            "node-removed",
            "node-removed",
            "selection-changed",
            "node-added",
            "node-added",
            "edge-added",
        ]
    );
    assert!(harness.editor.selection().is_empty());
    assert_eq!(harness.edge_row_ids(), vec!["edge-1".to_string()]);
}

#[test]
fn test_import_assigns_missing_edge_ids() {
    let mut harness = EditorHarness::empty();
    harness
        .editor
        .import_json(
            r#"{
                "nodes": [
                    { "id": "x", "title": "X", "position": { "x": 0, "y": 0 },
                      "inputs": [], "outputs": [{ "id": "o", "label": "", "type": "" }] },
                    { "id": "y", "title": "Y", "position": { "x": 200, "y": 0 },
                      "inputs": [{ "id": "i", "label": "", "type": "" }], "outputs": [] }
                ],
                "edges": [{ "source": "x", "target": "y", "sourcePort": "o", "targetPort": "i" }]
            }"#,
        )
        .unwrap();
    assert_eq!(harness.editor.edges()[0].id, "edge-1");
}

#[test]
fn test_import_error_keeps_current_graph() {
    let mut harness = EditorHarness::new();
    let err = harness
        .editor
        .import_json(r#"{ "nodes": [], "edges": [{ "source": "a", "target": "q", "sourcePort": "out", "targetPort": "in" }] }"#)
        .unwrap_err();
    assert!(matches!(err, EditorError::NodeNotFound(_)));
    assert_eq!(harness.editor.nodes().len(), 2);
    assert_eq!(harness.editor.edges().len(), 1);
    assert!(harness.tracker.is_empty());

    assert!(matches!(
        harness.editor.import_json("not json"),
        Err(EditorError::Parse(_))
    ));
}

#[test]
fn test_import_does_not_touch_view() {
    let mut harness = EditorHarness::new();
    harness.editor.pan_by(12.0, 34.0);
    harness.editor.set_zoom(1.5);
    let data: GraphData = harness.editor.export_graph();
    harness.editor.import_graph(&data).unwrap();
    assert_eq!(harness.editor.offset(), Point::new(12.0, 34.0));
    assert_eq!(harness.editor.scale(), 1.5);
}

// ============================================================================
// Clear graph
// ============================================================================

#[test]
fn test_clear_graph_removes_edges_then_nodes() {
    let mut harness = EditorHarness::new();
    harness.editor.clear_graph();
    assert!(harness.editor.nodes().is_empty());
    assert!(harness.editor.edges().is_empty());
    assert_eq!(harness.edge_rows.row_count(), 0);
    assert_eq!(
        harness.tracker.names(),
        vec!["edge-removed", "node-removed", "node-removed"]
    );
}

// ============================================================================
// Listeners
// ============================================================================

#[test]
fn test_listener_mutation_is_delivered_after_current_event() {
    let mut harness = EditorHarness::empty();
    harness.editor.on_event(|ed: &mut NodeEditor, e: &EditorEvent| {
        if let EditorEvent::NodeAdded { node_id, .. } = e {
            if node_id == "first" {
                ed.remove_node(node_id);
            }
        }
    });

    harness
        .editor
        .add_node(NodeSpec::new("first").with_id("first"))
        .unwrap();

    assert!(harness.editor.nodes().is_empty());
    assert_eq!(harness.tracker.names(), vec!["node-added", "node-removed"]);
}

#[test]
fn test_listener_cascade_during_dispatch_is_consistent() {
    let mut harness = EditorHarness::new();
    // Removing "b" as soon as "a" goes must not leave the edge dangling
    harness.editor.on_event(|ed: &mut NodeEditor, e: &EditorEvent| {
        if let EditorEvent::EdgeRemoved { .. } = e {
            ed.remove_node(&NodeId::from("b"));
        }
    });
    harness.editor.remove_node(&NodeId::from("a"));

    assert!(harness.editor.nodes().is_empty());
    assert!(harness.editor.edges().is_empty());
    assert_eq!(harness.tracker.count("edge-removed"), 1);
    assert_eq!(harness.tracker.count("node-removed"), 2);
}

#[test]
fn test_remove_listener() {
    let mut editor = NodeEditor::new();
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let id = editor.on_event(move |_: &mut NodeEditor, _: &EditorEvent| counter.set(counter.get() + 1));

    editor.set_zoom(2.0);
    editor.remove_listener(id);
    editor.set_zoom(3.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_listener_added_during_dispatch_sees_later_events() {
    let mut editor = NodeEditor::new();
    let late = EventTracker::new();
    let installed = Rc::new(Cell::new(false));
    {
        let late = late.clone();
        let installed = installed.clone();
        editor.on_event(move |ed: &mut NodeEditor, _: &EditorEvent| {
            if !installed.replace(true) {
                late.attach(ed);
            }
        });
    }
    editor.set_zoom(2.0);
    editor.set_zoom(3.0);
    assert_eq!(late.events(), vec![EditorEvent::ZoomChanged { scale: 3.0 }]);
}

#[test]
fn test_events_serialize_for_forwarding() {
    let mut harness = EditorHarness::empty();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    harness.editor.on_event(move |_: &mut NodeEditor, e: &EditorEvent| {
        sink.borrow_mut().push(serde_json::to_value(e).unwrap());
    });
    harness
        .editor
        .add_node(NodeSpec::new("n").with_id("n").at(1.0, 2.0))
        .unwrap();

    let value = &log.borrow()[0];
    assert_eq!(value["event"], "node-added");
    assert_eq!(value["nodeId"], "n");
    assert_eq!(value["data"]["position"], json!({ "x": 1.0, "y": 2.0 }));
}

// ============================================================================
// Grid / theme
// ============================================================================

#[test]
fn test_grid_follows_view() {
    let mut harness = EditorHarness::new();
    let mut grid = SvgGrid::new(Size::new(VIEW_WIDTH, VIEW_HEIGHT));

    harness.editor.paint_grid(&mut grid);
    let at_rest = grid.commands().to_string();
    assert!(at_rest.starts_with("M 0 0 L 0 800"));
    assert_eq!(grid.color(), Some(Theme::Dark.palette().grid));

    harness.editor.pan_by(5.0, 0.0);
    harness.editor.paint_grid(&mut grid);
    assert!(grid.commands().starts_with("M 5 0 L 5 800"));
}

#[test]
fn test_grid_hidden_and_themed() {
    let mut harness = EditorHarness::new();
    let mut grid = SvgGrid::new(Size::new(100.0, 100.0));

    harness.editor.set_config(&ConfigPatch::from_json(r#"{ "theme": "light" }"#).unwrap());
    harness.editor.paint_grid(&mut grid);
    assert_eq!(grid.color(), Some(Theme::Light.palette().grid));

    harness.editor.set_config(&ConfigPatch {
        show_grid: Some(false),
        ..Default::default()
    });
    assert!(harness.editor.grid_params().is_none());
    harness.editor.paint_grid(&mut grid);
    assert!(grid.commands().is_empty());
}

#[test]
fn test_custom_grid_surface_receives_params() {
    #[derive(Default)]
    struct Recorder(Vec<(f32, f32, Point)>);
    impl GridSurface for Recorder {
        fn paint_grid(&mut self, params: &node_graph_canvas::GridParams) {
            self.0.push((params.grid_size, params.scale, params.offset));
        }
    }

    let mut harness = EditorHarness::new();
    harness.editor.set_zoom(2.0);
    harness.editor.pan_by(3.0, 4.0);
    let mut recorder = Recorder::default();
    harness.editor.paint_grid(&mut recorder);
    assert_eq!(recorder.0, vec![(20.0, 2.0, Point::new(3.0, 4.0))]);
}

// ============================================================================
// Ids
// ============================================================================

#[test]
fn test_uuid_ids() {
    let mut editor = NodeEditor::new().with_id_generator(UuidIds);
    let a = editor.add_node(NodeSpec::new("a")).unwrap();
    let b = editor.add_node(NodeSpec::new("b")).unwrap();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("node-"));
    assert_eq!(a.as_str().len(), "node-".len() + 36);
}

#[test]
fn test_move_and_update_node() {
    let mut harness = EditorHarness::new();
    let a = NodeId::from("a");
    harness.editor.move_node(&a, Point::new(0.0, 0.0)).unwrap();
    harness.editor.move_node(&a, Point::new(0.0, 0.0)).unwrap();
    assert_eq!(harness.tracker.count("node-moved"), 1);

    harness.editor.update_node_title(&a, "Renamed").unwrap();
    assert_eq!(harness.editor.node(&a).unwrap().title, "Renamed");
    assert!(harness.editor.move_node(&NodeId::from("zz"), Point::ZERO).is_err());
}
