use crate::graph::ConnectionError;
use crate::ids::{EdgeId, NodeId, PortId};
use thiserror::Error;

/// Errors raised by graph and editor operations.
///
/// Removal of unknown ids is never an error; only operations that would
/// otherwise corrupt or silently overwrite state fail.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),
    #[error("port {port} not found on node {node}")]
    PortNotFound { node: NodeId, port: PortId },
    #[error("a node with id {0} already exists")]
    DuplicateId(NodeId),
    #[error("an edge with id {0} already exists")]
    DuplicateEdgeId(EdgeId),
    #[error("an identical edge already exists")]
    DuplicateEdge,
    #[error("invalid connection: {0}")]
    InvalidConnection(#[from] ConnectionError),
    #[error("graph data could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid graph data: {0}")]
    InvalidGraphData(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;
