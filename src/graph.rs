use crate::error::{EditorError, Result};
use crate::geometry::Point;
use crate::ids::{EdgeId, NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Which side of a node a port sits on.
///
/// The role is positional: a port is an input because it is stored in the
/// node's input list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Input,
    Output,
}

impl PortRole {
    pub fn opposite(self) -> PortRole {
        match self {
            PortRole::Input => PortRole::Output,
            PortRole::Output => PortRole::Input,
        }
    }
}

/// A connection point on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    #[serde(default)]
    pub label: String,
    /// Free-form type tag. Carried for the host, never enforced here.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Port {
    pub fn new(id: impl Into<PortId>, label: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: kind.into(),
        }
    }
}

/// A node in the graph. Owns its ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    /// Top-left anchor in canvas coordinates
    pub position: Point,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    /// Opaque display payload, any JSON value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    /// Visual accent; no effect on graph semantics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Node {
    /// Role and index of a port within its list
    pub fn port_slot(&self, port: &PortId) -> Option<(PortRole, usize)> {
        if let Some(i) = self.inputs.iter().position(|p| &p.id == port) {
            return Some((PortRole::Input, i));
        }
        self.outputs
            .iter()
            .position(|p| &p.id == port)
            .map(|i| (PortRole::Output, i))
    }

    pub fn port_role(&self, port: &PortId) -> Option<PortRole> {
        self.port_slot(port).map(|(role, _)| role)
    }

    pub fn has_port(&self, port: &PortId, role: PortRole) -> bool {
        self.ports(role).iter().any(|p| &p.id == port)
    }

    pub fn ports(&self, role: PortRole) -> &[Port] {
        match role {
            PortRole::Input => &self.inputs,
            PortRole::Output => &self.outputs,
        }
    }

    /// All ports with their role, inputs first
    pub fn all_ports(&self) -> impl Iterator<Item = (PortRole, &Port)> + '_ {
        self.inputs
            .iter()
            .map(|p| (PortRole::Input, p))
            .chain(self.outputs.iter().map(|p| (PortRole::Output, p)))
    }

    pub fn port_ref(&self, port: &PortId) -> Option<PortRef> {
        let role = self.port_role(port)?;
        Some(PortRef::new(self.id.clone(), port.clone(), role))
    }

    fn duplicate_port(&self) -> Option<&PortId> {
        let mut seen = HashSet::new();
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .map(|p| &p.id)
            .find(|id| !seen.insert(*id))
    }
}

/// Everything needed to create a node. Missing id and position are filled in
/// by the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    pub id: Option<NodeId>,
    pub title: String,
    pub position: Option<Point>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub content: Option<serde_json::Value>,
    pub color: Option<String>,
}

impl NodeSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn input(mut self, id: &str, label: &str, kind: &str) -> Self {
        self.inputs.push(Port::new(id, label, kind));
        self
    }

    pub fn output(mut self, id: &str, label: &str, kind: &str) -> Self {
        self.outputs.push(Port::new(id, label, kind));
        self
    }

    pub fn content(mut self, content: impl Into<serde_json::Value>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn into_node(self, id: NodeId, fallback_position: Point) -> Node {
        Node {
            id,
            title: self.title,
            position: self.position.unwrap_or(fallback_position),
            inputs: self.inputs,
            outputs: self.outputs,
            content: self.content,
            color: self.color,
        }
    }
}

impl From<Node> for NodeSpec {
    fn from(node: Node) -> Self {
        Self {
            id: Some(node.id),
            title: node.title,
            position: Some(node.position),
            inputs: node.inputs,
            outputs: node.outputs,
            content: node.content,
            color: node.color,
        }
    }
}

/// A resolved reference to one port of one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortId,
    pub role: PortRole,
}

impl PortRef {
    pub fn new(node: NodeId, port: PortId, role: PortRole) -> Self {
        Self { node, port, role }
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_port: PortId,
    pub target: NodeId,
    pub target_port: PortId,
}

impl Edge {
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// Same (source, source port, target, target port) tuple
    pub fn same_endpoints(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.source_port == other.source_port
            && self.target == other.target
            && self.target_port == other.target_port
    }

    pub fn source_ref(&self) -> PortRef {
        PortRef::new(self.source.clone(), self.source_port.clone(), PortRole::Output)
    }

    pub fn target_ref(&self) -> PortRef {
        PortRef::new(self.target.clone(), self.target_port.clone(), PortRole::Input)
    }
}

/// Node and edge collections with the structural invariants enforced.
///
/// Nodes and edges keep insertion order. Every edge references existing nodes
/// and ports on those nodes; removing a node removes its edges in the same call.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_lookup: HashMap<NodeId, usize>,
    edge_lookup: HashMap<EdgeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let index = self.node_index(id)?;
        self.nodes.get_mut(index)
    }

    /// Insertion-order position of a node
    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.node_lookup.get(id).copied()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_lookup.get(id).map(|&i| &self.edges[i])
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Insert a fully formed node.
    pub fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.contains_node(&node.id) {
            return Err(EditorError::DuplicateId(node.id));
        }
        if let Some(port) = node.duplicate_port() {
            return Err(EditorError::InvalidGraphData(format!(
                "node {} declares port {} more than once",
                node.id, port
            )));
        }
        self.node_lookup.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node and every edge touching it.
    ///
    /// Returns the node and the removed edges in their original order, or
    /// `None` if the node did not exist.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<(Node, Vec<Edge>)> {
        let index = self.node_index(id)?;
        let removed_edges = self.take_edges_where(|e| e.touches(id));
        let node = self.nodes.remove(index);
        self.reindex_nodes();
        Some((node, removed_edges))
    }

    /// Insert an edge after checking that it would not dangle, loop or duplicate.
    ///
    /// Port roles are trusted: the ports only need to exist on their nodes.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<()> {
        if self.contains_edge(&edge.id) {
            return Err(EditorError::DuplicateEdgeId(edge.id));
        }
        self.require_port(&edge.source, &edge.source_port)?;
        self.require_port(&edge.target, &edge.target_port)?;
        if edge.source == edge.target {
            return Err(ConnectionError::SelfLoop.into());
        }
        if self.edges.iter().any(|e| e.same_endpoints(&edge)) {
            return Err(EditorError::DuplicateEdge);
        }
        self.edge_lookup.insert(edge.id.clone(), self.edges.len());
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let index = self.edge_lookup.get(id).copied()?;
        let edge = self.edges.remove(index);
        self.reindex_edges();
        Some(edge)
    }

    /// Find an edge by its endpoint tuple
    pub fn find_edge(
        &self,
        source: &NodeId,
        source_port: &PortId,
        target: &NodeId,
        target_port: &PortId,
    ) -> Option<&Edge> {
        self.edges.iter().find(|e| {
            &e.source == source
                && &e.source_port == source_port
                && &e.target == target
                && &e.target_port == target_port
        })
    }

    /// Ids of every edge touching `node`
    pub fn edges_touching(&self, node: &NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.touches(node))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Move a node, returning its previous position
    pub fn set_node_position(&mut self, id: &NodeId, position: Point) -> Option<Point> {
        let node = self.node_mut(id)?;
        let previous = node.position;
        node.position = position;
        Some(previous)
    }

    /// Look up a port and return a reference carrying its role
    pub fn resolve_port(&self, node: &NodeId, port: &PortId) -> Option<PortRef> {
        self.node(node)?.port_ref(port)
    }

    /// Remove all edges, then all nodes, returning both in insertion order.
    pub fn clear(&mut self) -> (Vec<Edge>, Vec<Node>) {
        let edges = std::mem::take(&mut self.edges);
        let nodes = std::mem::take(&mut self.nodes);
        self.node_lookup.clear();
        self.edge_lookup.clear();
        (edges, nodes)
    }

    fn require_port(&self, node: &NodeId, port: &PortId) -> Result<()> {
        let n = self
            .node(node)
            .ok_or_else(|| EditorError::NodeNotFound(node.clone()))?;
        if n.port_role(port).is_none() {
            return Err(EditorError::PortNotFound {
                node: node.clone(),
                port: port.clone(),
            });
        }
        Ok(())
    }

    fn take_edges_where(&mut self, pred: impl Fn(&Edge) -> bool) -> Vec<Edge> {
        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| pred(e));
        self.edges = kept;
        if !removed.is_empty() {
            self.reindex_edges();
        }
        removed
    }

    fn reindex_nodes(&mut self) {
        self.node_lookup = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    fn reindex_edges(&mut self) {
        self.edge_lookup = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// Reasons an interactively drafted connection is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("port {port} not found on node {node}")]
    PortNotFound { node: NodeId, port: PortId },
    #[error("cannot connect a port to itself")]
    SamePort,
    #[error("cannot connect a node to itself")]
    SelfLoop,
    #[error("must connect an output to an input")]
    IncompatibleDirection,
    #[error("an identical edge already exists")]
    Duplicate,
    #[error("{0}")]
    Custom(String),
}

/// Order two opposite-role ports as (output, input).
pub fn normalize_direction(a: PortRef, b: PortRef) -> (PortRef, PortRef) {
    if a.role == PortRole::Output {
        (a, b)
    } else {
        (b, a)
    }
}

/// Custom rules for connections made by dragging between ports.
///
/// `from` is the port the drag started on and `to` the port it was released
/// over; either may be the output. Closures with the same signature implement
/// this trait, which is the intended hook for type-checked ports.
///
/// [`StructuralValidator`] always runs before a custom validator, so a host
/// rule can only narrow what connects.
///
/// ```ignore
/// editor.set_connection_validator(
///     CompositeValidator::standard().add(|a: &PortRef, b: &PortRef, g: &Graph| {
///         // compare port type tags here
///         Ok(())
///     }),
/// );
/// ```
pub trait ConnectionValidator {
    fn validate(&self, from: &PortRef, to: &PortRef, graph: &Graph) -> std::result::Result<(), ConnectionError>;
}

impl<F> ConnectionValidator for F
where
    F: Fn(&PortRef, &PortRef, &Graph) -> std::result::Result<(), ConnectionError>,
{
    fn validate(&self, from: &PortRef, to: &PortRef, graph: &Graph) -> std::result::Result<(), ConnectionError> {
        self(from, to, graph)
    }
}

/// Structural rules: both ports exist with their stated roles, they are on
/// different nodes and one is an output while the other is an input.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralValidator;

impl ConnectionValidator for StructuralValidator {
    fn validate(&self, from: &PortRef, to: &PortRef, graph: &Graph) -> std::result::Result<(), ConnectionError> {
        for port in [from, to] {
            let exists = graph
                .node(&port.node)
                .is_some_and(|n| n.has_port(&port.port, port.role));
            if !exists {
                return Err(ConnectionError::PortNotFound {
                    node: port.node.clone(),
                    port: port.port.clone(),
                });
            }
        }
        if from == to {
            return Err(ConnectionError::SamePort);
        }
        if from.node == to.node {
            return Err(ConnectionError::SelfLoop);
        }
        if from.role == to.role {
            return Err(ConnectionError::IncompatibleDirection);
        }
        Ok(())
    }
}

/// Refuses a connection identical to an existing edge, in either drag direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, from: &PortRef, to: &PortRef, graph: &Graph) -> std::result::Result<(), ConnectionError> {
        let (out, inp) = normalize_direction(from.clone(), to.clone());
        if graph
            .find_edge(&out.node, &out.port, &inp.node, &inp.port)
            .is_some()
        {
            Err(ConnectionError::Duplicate)
        } else {
            Ok(())
        }
    }
}

/// Runs validators in order; the first error wins.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural checks followed by duplicate rejection
    pub fn standard() -> Self {
        Self::new().add(StructuralValidator).add(NoDuplicatesValidator)
    }

    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, from: &PortRef, to: &PortRef, graph: &Graph) -> std::result::Result<(), ConnectionError> {
        for v in &self.validators {
            v.validate(from, to, graph)?;
        }
        Ok(())
    }
}

/// Validate a drafted connection and return it oriented as (output, input).
///
/// Structural rules are checked first whatever `validator` is.
pub fn validate_connection(
    from: &PortRef,
    to: &PortRef,
    graph: &Graph,
    validator: &dyn ConnectionValidator,
) -> std::result::Result<(PortRef, PortRef), ConnectionError> {
    StructuralValidator.validate(from, to, graph)?;
    validator.validate(from, to, graph)?;
    Ok(normalize_direction(from.clone(), to.clone()))
}
