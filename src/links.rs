//! Routed edge paths for rendering.
//!
//! [`EdgeLayer`] caches one [`EdgePath`] per edge in canvas coordinates and
//! re-routes only the edges touching nodes that moved. Slint hosts can bind a
//! `VecModel` and get every change mirrored into it.
//!
//! ```ignore
//! let model = Rc::new(VecModel::<EdgeRow>::default());
//! editor.bind_edge_model(model.clone(), |id, path| EdgeRow { id, path });
//! window.set_edges(ModelRc::from(model));
//! ```

use crate::graph::{Edge, Graph};
use crate::ids::{EdgeId, NodeId};
use crate::path::{route, EdgePath, EdgeStyle};
use crate::state::{GeometryCache, NodeMetrics};
use slint::{Model, SharedString, VecModel};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, rows: &mut dyn Iterator<Item = (&EdgeId, &EdgePath)>);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(SharedString, SharedString) -> P,
{
    fn sync(&self, rows: &mut dyn Iterator<Item = (&EdgeId, &EdgePath)>) {
        let mut count = 0;
        for (i, (id, path)) in rows.enumerate() {
            let item = (self.constructor)(
                SharedString::from(id.as_str()),
                SharedString::from(path.to_svg().as_str()),
            );
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
            count = i + 1;
        }
        // Remove excess rows
        while self.model.row_count() > count {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Everything routing needs to place an edge's endpoints.
#[derive(Clone, Copy)]
pub struct RouteContext<'a> {
    pub graph: &'a Graph,
    pub geometry: &'a GeometryCache,
    pub metrics: &'a NodeMetrics,
    pub style: EdgeStyle,
}

impl RouteContext<'_> {
    /// Route one edge from its source port anchor to its target port anchor
    pub fn route_edge(&self, edge: &Edge) -> Option<EdgePath> {
        let source = self.graph.node(&edge.source)?;
        let target = self.graph.node(&edge.target)?;
        let start = self
            .geometry
            .port_position(source, &edge.source_port, self.metrics)?;
        let end = self
            .geometry
            .port_position(target, &edge.target_port, self.metrics)?;
        Some(route(self.style, start, end))
    }
}

/// Cache of routed paths, one per edge.
#[derive(Default)]
pub struct EdgeLayer {
    paths: HashMap<EdgeId, EdgePath>,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl EdgeLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a Slint model for automatic synchronization.
    ///
    /// `constructor` builds a row from (edge id, SVG path commands). The model
    /// is filled immediately on the next sync.
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path(&self, id: &EdgeId) -> Option<&EdgePath> {
        self.paths.get(id)
    }

    /// Routed paths in graph edge order
    pub fn iter<'a>(&'a self, graph: &'a Graph) -> impl Iterator<Item = (&'a EdgeId, &'a EdgePath)> + 'a {
        graph
            .edges()
            .iter()
            .filter_map(move |e| self.paths.get(&e.id).map(|p| (&e.id, p)))
    }

    /// Route a newly added edge
    pub fn insert(&mut self, ctx: &RouteContext<'_>, edge: &Edge) {
        if let Some(path) = ctx.route_edge(edge) {
            self.paths.insert(edge.id.clone(), path);
        }
        self.sync(ctx.graph);
    }

    pub fn remove(&mut self, id: &EdgeId, graph: &Graph) -> bool {
        let removed = self.paths.remove(id).is_some();
        if removed {
            self.sync(graph);
        }
        removed
    }

    pub fn clear(&mut self, graph: &Graph) {
        self.paths.clear();
        self.sync(graph);
    }

    /// Re-route every edge, e.g. after a style change or import
    pub fn reroute_all(&mut self, ctx: &RouteContext<'_>) {
        self.paths = ctx
            .graph
            .edges()
            .iter()
            .filter_map(|e| ctx.route_edge(e).map(|p| (e.id.clone(), p)))
            .collect();
        tracing::trace!(edges = self.paths.len(), "rerouted all edges");
        self.sync(ctx.graph);
    }

    /// Re-route the edges touching any of `nodes`
    pub fn reroute_nodes(&mut self, ctx: &RouteContext<'_>, nodes: &HashSet<NodeId>) {
        if nodes.is_empty() {
            return;
        }
        for edge in ctx.graph.edges() {
            if nodes.contains(&edge.source) || nodes.contains(&edge.target) {
                if let Some(path) = ctx.route_edge(edge) {
                    self.paths.insert(edge.id.clone(), path);
                }
            }
        }
        self.sync(ctx.graph);
    }

    fn sync(&self, graph: &Graph) {
        if let Some(syncer) = &self.syncer {
            syncer.sync(&mut self.iter(graph));
        }
    }
}
