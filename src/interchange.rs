//! Structural JSON import/export.
//!
//! Only the graph is exchanged. View state (pan/zoom), selection and host
//! measurements are never part of the payload.

use crate::error::Result;
use crate::graph::{Edge, Graph, Node};
use crate::ids::{EdgeId, IdGenerator, NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Exported graph: nodes then edges, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

/// An edge on the wire. The id is optional on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,
    pub source: NodeId,
    pub target: NodeId,
    pub source_port: PortId,
    pub target_port: PortId,
}

impl From<&Edge> for EdgeData {
    fn from(edge: &Edge) -> Self {
        Self {
            id: Some(edge.id.clone()),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_port: edge.source_port.clone(),
            target_port: edge.target_port.clone(),
        }
    }
}

impl GraphData {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().iter().map(EdgeData::from).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a standalone graph from the payload.
    ///
    /// Nodes are added in array order, then edges. Edges without an id get one
    /// from `ids`. Any structural problem fails the whole build; an edge
    /// identical to an earlier one is skipped.
    pub fn build(&self, ids: &mut dyn IdGenerator) -> Result<Graph> {
        let mut graph = Graph::new();
        for node in &self.nodes {
            graph.insert_node(node.clone())?;
        }

        let explicit: HashSet<&EdgeId> = self.edges.iter().filter_map(|e| e.id.as_ref()).collect();
        for data in &self.edges {
            if graph
                .find_edge(&data.source, &data.source_port, &data.target, &data.target_port)
                .is_some()
            {
                tracing::warn!(source = %data.source, target = %data.target, "skipping duplicate edge in import");
                continue;
            }
            let id = match &data.id {
                Some(id) => id.clone(),
                None => fresh_edge_id(ids, |id| explicit.contains(id) || graph.contains_edge(id)),
            };
            graph.insert_edge(Edge {
                id,
                source: data.source.clone(),
                source_port: data.source_port.clone(),
                target: data.target.clone(),
                target_port: data.target_port.clone(),
            })?;
        }

        Ok(graph)
    }
}

/// Draw edge ids until one is not taken
pub(crate) fn fresh_edge_id(ids: &mut dyn IdGenerator, taken: impl Fn(&EdgeId) -> bool) -> EdgeId {
    loop {
        let id = ids.next_edge_id();
        if !taken(&id) {
            return id;
        }
    }
}

/// Draw node ids until one is not taken
pub(crate) fn fresh_node_id(ids: &mut dyn IdGenerator, taken: impl Fn(&NodeId) -> bool) -> NodeId {
    loop {
        let id = ids.next_node_id();
        if !taken(&id) {
            return id;
        }
    }
}
