//! The public editor facade.
//!
//! [`NodeEditor`] owns the graph, the view transform, selection, measured
//! geometry and routed edges, and keeps them consistent. Every public method
//! runs to completion and then delivers the events it raised.

use crate::config::{ConfigPatch, EditorConfig, Palette};
use crate::error::{EditorError, Result};
use crate::events::{EditorEvent, EventListener, EventQueue, ListenerId};
use crate::geometry::{Point, Size};
use crate::graph::{CompositeValidator, ConnectionValidator, Edge, Graph, Node, NodeSpec};
use crate::hit_test::{HitTarget, Scene};
use crate::ids::{EdgeId, IdGenerator, NodeId, PortId, SequentialIds};
use crate::interaction::InteractionState;
use crate::interchange::{fresh_edge_id, fresh_node_id, GraphData};
use crate::keyboard::FocusTarget;
use crate::links::{EdgeLayer, RouteContext};
use crate::path::EdgePath;
use crate::selection::{SelectionManager, SelectionSummary};
use crate::state::GeometryCache;
use crate::viewport::Viewport;
use slint::{SharedString, VecModel};
use std::collections::HashSet;
use std::rc::Rc;

/// An interactive node-graph editing surface.
pub struct NodeEditor {
    pub(crate) graph: Graph,
    pub(crate) viewport: Viewport,
    pub(crate) selection: SelectionManager,
    pub(crate) geometry: GeometryCache,
    pub(crate) edge_layer: EdgeLayer,
    pub(crate) interaction: InteractionState,
    pub(crate) config: EditorConfig,
    pub(crate) focus: FocusTarget,
    pub(crate) events: EventQueue,
    ids: Box<dyn IdGenerator>,
    pub(crate) validator: Box<dyn ConnectionValidator>,
    mounted: bool,
}

impl Default for NodeEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeEditor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(mut config: EditorConfig) -> Self {
        let viewport = Viewport::new(config.min_zoom, config.max_zoom);
        config.min_zoom = viewport.min_zoom();
        config.max_zoom = viewport.max_zoom();
        Self {
            graph: Graph::new(),
            viewport,
            selection: SelectionManager::new(),
            geometry: GeometryCache::new(),
            edge_layer: EdgeLayer::new(),
            interaction: InteractionState::Idle,
            config,
            focus: FocusTarget::Canvas,
            events: EventQueue::default(),
            ids: Box::new(SequentialIds::new()),
            validator: Box::new(CompositeValidator::standard()),
            mounted: false,
        }
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the rules consulted when the user drags a connection
    pub fn set_connection_validator(&mut self, validator: impl ConnectionValidator + 'static) {
        self.validator = Box::new(validator);
    }

    // ========================================================================
    // Lifecycle / configuration
    // ========================================================================

    /// Attach to a canvas of the given screen size and announce readiness.
    pub fn mount(&mut self, size: Size) {
        self.viewport.set_size(size);
        self.mounted = true;
        tracing::info!(width = size.width, height = size.height, "editor mounted");
        self.events.push(EditorEvent::EditorReady);
        self.flush_events();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Record a new canvas size. The transform is left alone.
    pub fn resize(&mut self, size: Size) {
        self.viewport.set_size(size);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn palette(&self) -> Palette {
        self.config.palette()
    }

    /// Merge a partial configuration
    pub fn set_config(&mut self, patch: &ConfigPatch) {
        let changes = self.config.apply(patch);
        if changes.zoom_bounds
            && self
                .viewport
                .set_zoom_bounds(self.config.min_zoom, self.config.max_zoom)
        {
            self.events.push(EditorEvent::ZoomChanged {
                scale: self.viewport.scale(),
            });
        }
        if changes.routing {
            self.reroute_all();
        }
        tracing::info!(?patch, "configuration updated");
        self.flush_events();
    }

    /// Subscribe to notifications
    pub fn on_event(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        self.events.subscribe(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.events.unsubscribe(id);
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.graph.edge(id)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale()
    }

    pub fn offset(&self) -> Point {
        self.viewport.offset()
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Routed path of an edge, in canvas coordinates
    pub fn edge_path(&self, id: &EdgeId) -> Option<&EdgePath> {
        self.edge_layer.path(id)
    }

    /// All routed paths in edge order
    pub fn edge_paths(&self) -> impl Iterator<Item = (&EdgeId, &EdgePath)> + '_ {
        self.edge_layer.iter(&self.graph)
    }

    /// Mirror routed edges into a Slint model as (edge id, SVG path) rows
    pub fn bind_edge_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString) -> P + 'static,
    {
        self.edge_layer.bind_model(model, constructor);
        self.reroute_all();
    }

    /// What lies under a screen point
    pub fn hit_test(&self, screen: Point) -> HitTarget {
        self.scene().hit(screen, self.edge_layer.iter(&self.graph))
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.viewport.screen_to_canvas(screen)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.viewport.canvas_to_screen(canvas)
    }

    // ========================================================================
    // Graph mutation
    // ========================================================================

    /// Add a node and return its id.
    ///
    /// Without an explicit position the node is centered in the current view.
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<NodeId> {
        let id = self.add_node_inner(spec)?;
        self.flush_events();
        Ok(id)
    }

    /// Remove a node and every edge touching it. Unknown ids are ignored.
    pub fn remove_node(&mut self, id: &NodeId) {
        self.remove_node_inner(id);
        self.flush_events();
    }

    /// Connect an output port to an input port.
    ///
    /// Returns `Ok(None)` when an identical edge already exists. Port roles
    /// are not checked here; drafted connections go through the validator.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        source_port: impl Into<PortId>,
        target: impl Into<NodeId>,
        target_port: impl Into<PortId>,
    ) -> Result<Option<EdgeId>> {
        let result = self.add_edge_inner(
            source.into(),
            source_port.into(),
            target.into(),
            target_port.into(),
        );
        self.flush_events();
        result
    }

    /// Remove an edge. Unknown ids are ignored.
    pub fn remove_edge(&mut self, id: &EdgeId) {
        self.remove_edge_inner(id);
        self.flush_events();
    }

    pub fn update_node_content(&mut self, id: &NodeId, content: Option<serde_json::Value>) -> Result<()> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        node.content = content;
        Ok(())
    }

    pub fn update_node_title(&mut self, id: &NodeId, title: impl Into<String>) -> Result<()> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        node.title = title.into();
        Ok(())
    }

    /// Move a node to a canvas position, emitting node-moved if it changed
    pub fn move_node(&mut self, id: &NodeId, position: Point) -> Result<()> {
        let previous = self
            .graph
            .set_node_position(id, position)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        if previous != position {
            self.reroute_nodes(&HashSet::from([id.clone()]));
            self.events.push(EditorEvent::NodeMoved {
                node_id: id.clone(),
                position,
            });
        }
        self.flush_events();
        Ok(())
    }

    /// Host-measured logical size of a rendered node
    pub fn report_node_size(&mut self, id: &NodeId, size: Size) {
        if !self.graph.contains_node(id) {
            return;
        }
        self.geometry.report_node_size(id.clone(), size);
        self.reroute_nodes(&HashSet::from([id.clone()]));
    }

    /// Host-measured anchor of a port relative to its node's top-left corner
    pub fn report_port_offset(&mut self, node: &NodeId, port: &PortId, offset: Point) {
        let known = self
            .graph
            .node(node)
            .is_some_and(|n| n.port_role(port).is_some());
        if !known {
            return;
        }
        self.geometry
            .report_port_offset(node.clone(), port.clone(), offset);
        self.reroute_nodes(&HashSet::from([node.clone()]));
    }

    /// Remove every edge, then every node
    pub fn clear_graph(&mut self) {
        self.clear_graph_inner();
        self.flush_events();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_summary(&self) -> SelectionSummary {
        self.selection.summary()
    }

    /// Selected node ids in insertion order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .iter()
            .filter(|n| self.selection.contains_node(&n.id))
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn selected_edge(&self) -> Option<&EdgeId> {
        self.selection.selected_edge()
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.push_selection_changed();
        }
        self.flush_events();
    }

    pub fn select_node(&mut self, id: &NodeId) -> Result<()> {
        if !self.graph.contains_node(id) {
            return Err(EditorError::NodeNotFound(id.clone()));
        }
        if self.selection.select_node(id) {
            self.push_selection_changed();
        }
        self.flush_events();
        Ok(())
    }

    pub fn toggle_node(&mut self, id: &NodeId) -> Result<()> {
        if !self.graph.contains_node(id) {
            return Err(EditorError::NodeNotFound(id.clone()));
        }
        self.selection.toggle_node(id);
        self.push_selection_changed();
        self.flush_events();
        Ok(())
    }

    pub fn select_edge(&mut self, id: &EdgeId) -> Result<()> {
        if !self.graph.contains_edge(id) {
            return Err(EditorError::EdgeNotFound(id.clone()));
        }
        if self.selection.select_edge(id) {
            self.push_selection_changed();
        }
        self.flush_events();
        Ok(())
    }

    pub fn select_all(&mut self) {
        let all: Vec<NodeId> = self.graph.nodes().iter().map(|n| n.id.clone()).collect();
        if self.selection.select_nodes(all) {
            self.push_selection_changed();
        }
        self.flush_events();
    }

    /// Delete the selected edge, or every selected node with its edges.
    ///
    /// A bulk delete reports one selection change after all removals.
    pub fn delete_selected(&mut self) {
        if let Some(edge) = self.selection.selected_edge().cloned() {
            self.remove_edge_inner(&edge);
        } else {
            let mut selection_changed = false;
            for id in self.selected_nodes() {
                selection_changed |= self.detach_node(&id);
            }
            if selection_changed {
                self.push_selection_changed();
            }
        }
        self.flush_events();
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Set the scale, clamped, keeping the offset. Emits the stored scale.
    pub fn set_zoom(&mut self, scale: f32) -> f32 {
        let stored = self.viewport.set_zoom(scale);
        self.events.push(EditorEvent::ZoomChanged { scale: stored });
        self.flush_events();
        stored
    }

    /// Zoom keeping the canvas point under `screen` fixed
    pub fn zoom_at(&mut self, scale: f32, screen: Point) -> f32 {
        let before = self.viewport.scale();
        let stored = self.viewport.zoom_to_point(scale, screen);
        if stored != before {
            self.events.push(EditorEvent::ZoomChanged { scale: stored });
        }
        self.flush_events();
        stored
    }

    /// Shift the view by a screen-space delta
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.viewport.pan(dx, dy);
    }

    // ========================================================================
    // Interchange
    // ========================================================================

    pub fn export_graph(&self) -> GraphData {
        let data = GraphData::from_graph(&self.graph);
        tracing::debug!(nodes = data.nodes.len(), edges = data.edges.len(), "exported graph");
        data
    }

    pub fn export_json(&self) -> Result<String> {
        self.export_graph().to_json()
    }

    /// Replace the graph with `data`.
    ///
    /// The payload is validated in full first; on error the current graph is
    /// left untouched.
    pub fn import_graph(&mut self, data: &GraphData) -> Result<()> {
        let mut imported = data.build(self.ids.as_mut())?;
        self.clear_graph_inner();

        let (edges, nodes) = imported.clear();
        for node in nodes {
            let id = node.id.clone();
            self.graph.insert_node(node.clone())?;
            self.events.push(EditorEvent::NodeAdded { node_id: id, data: node });
        }
        for edge in edges {
            self.graph.insert_edge(edge.clone())?;
            self.events.push(EditorEvent::edge_added(&edge));
        }
        self.reroute_all();
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "imported graph"
        );
        self.flush_events();
        Ok(())
    }

    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let data = GraphData::from_json(json)?;
        self.import_graph(&data)
    }

    // ========================================================================
    // Internals: mutate and queue events without flushing
    // ========================================================================

    pub(crate) fn scene(&self) -> Scene<'_> {
        Scene {
            graph: &self.graph,
            geometry: &self.geometry,
            metrics: &self.config.node_metrics,
            viewport: &self.viewport,
        }
    }

    pub(crate) fn push_selection_changed(&mut self) {
        self.events
            .push(EditorEvent::SelectionChanged(self.selection.summary()));
    }

    fn add_node_inner(&mut self, spec: NodeSpec) -> Result<NodeId> {
        let id = match &spec.id {
            Some(id) if self.graph.contains_node(id) => {
                return Err(EditorError::DuplicateId(id.clone()));
            }
            Some(id) => id.clone(),
            None => {
                let graph = &self.graph;
                fresh_node_id(self.ids.as_mut(), |id| graph.contains_node(id))
            }
        };
        let fallback = {
            let size = self
                .config
                .node_metrics
                .estimate_size(spec.inputs.len(), spec.outputs.len());
            self.viewport.canvas_center() - Point::new(size.width / 2.0, size.height / 2.0)
        };
        let node = spec.into_node(id.clone(), fallback);
        self.graph.insert_node(node.clone())?;
        tracing::debug!(node = %id, "node added");
        self.events.push(EditorEvent::NodeAdded {
            node_id: id.clone(),
            data: node,
        });
        Ok(id)
    }

    pub(crate) fn remove_node_inner(&mut self, id: &NodeId) {
        if self.detach_node(id) {
            self.push_selection_changed();
        }
    }

    /// Remove a node and its edges, queueing the removal events. Returns true
    /// if the selection lost an item; the caller reports that.
    fn detach_node(&mut self, id: &NodeId) -> bool {
        let Some((node, edges)) = self.graph.remove_node(id) else {
            return false;
        };
        let mut selection_changed = false;
        for edge in &edges {
            self.edge_layer.remove(&edge.id, &self.graph);
            selection_changed |= self.selection.remove_edge(&edge.id);
            self.events.push(EditorEvent::EdgeRemoved {
                edge_id: edge.id.clone(),
            });
        }
        self.geometry.forget_node(id);
        selection_changed |= self.selection.remove_node(id);
        if self.interaction.references_node(id) {
            self.interaction = InteractionState::Idle;
        }
        tracing::debug!(node = %node.id, edges = edges.len(), "node removed");
        self.events.push(EditorEvent::NodeRemoved {
            node_id: node.id,
        });
        selection_changed
    }

    pub(crate) fn add_edge_inner(
        &mut self,
        source: NodeId,
        source_port: PortId,
        target: NodeId,
        target_port: PortId,
    ) -> Result<Option<EdgeId>> {
        if self
            .graph
            .find_edge(&source, &source_port, &target, &target_port)
            .is_some()
        {
            tracing::warn!(%source, %target, "duplicate edge rejected");
            return Ok(None);
        }
        let graph = &self.graph;
        let id = fresh_edge_id(self.ids.as_mut(), |id| graph.contains_edge(id));
        let edge = Edge {
            id: id.clone(),
            source,
            source_port,
            target,
            target_port,
        };
        self.graph.insert_edge(edge.clone())?;
        let ctx = RouteContext {
            graph: &self.graph,
            geometry: &self.geometry,
            metrics: &self.config.node_metrics,
            style: self.config.edge_style,
        };
        self.edge_layer.insert(&ctx, &edge);
        tracing::debug!(edge = %id, "edge added");
        self.events.push(EditorEvent::edge_added(&edge));
        Ok(Some(id))
    }

    pub(crate) fn remove_edge_inner(&mut self, id: &EdgeId) {
        let Some(edge) = self.graph.remove_edge(id) else {
            return;
        };
        self.edge_layer.remove(id, &self.graph);
        tracing::debug!(edge = %edge.id, "edge removed");
        self.events.push(EditorEvent::EdgeRemoved { edge_id: edge.id });
        if self.selection.remove_edge(id) {
            self.push_selection_changed();
        }
    }

    fn clear_graph_inner(&mut self) {
        self.interaction = InteractionState::Idle;
        let selection_changed = self.selection.clear();
        let (edges, nodes) = self.graph.clear();
        for edge in edges {
            self.events.push(EditorEvent::EdgeRemoved { edge_id: edge.id });
        }
        for node in nodes {
            self.events.push(EditorEvent::NodeRemoved { node_id: node.id });
        }
        self.geometry.clear();
        self.edge_layer.clear(&self.graph);
        if selection_changed {
            self.push_selection_changed();
        }
        tracing::debug!("graph cleared");
    }

    pub(crate) fn reroute_all(&mut self) {
        let ctx = RouteContext {
            graph: &self.graph,
            geometry: &self.geometry,
            metrics: &self.config.node_metrics,
            style: self.config.edge_style,
        };
        self.edge_layer.reroute_all(&ctx);
    }

    pub(crate) fn reroute_nodes(&mut self, nodes: &HashSet<NodeId>) {
        let ctx = RouteContext {
            graph: &self.graph,
            geometry: &self.geometry,
            metrics: &self.config.node_metrics,
            style: self.config.edge_style,
        };
        self.edge_layer.reroute_nodes(&ctx, nodes);
    }
}
