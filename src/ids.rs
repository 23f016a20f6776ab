//! Identifier newtypes and id generation.
//!
//! Ids are opaque strings on the wire. Generation is behind [`IdGenerator`] so
//! hosts and tests can make it deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Globally unique node identifier
    NodeId
);
string_id!(
    /// Globally unique edge identifier
    EdgeId
);
string_id!(
    /// Port identifier, unique within its owning node
    PortId
);

/// Source of fresh node and edge ids.
///
/// The editor keeps drawing from the generator until it gets an id that is
/// not already in use, so generators need not know about existing ids.
pub trait IdGenerator {
    fn next_node_id(&mut self) -> NodeId;
    fn next_edge_id(&mut self) -> EdgeId;
}

/// Monotonic counter ids: `node-1`, `node-2`, `edge-1`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next_node: u64,
    next_edge: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_node_id(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(format!("node-{}", self.next_node))
    }

    fn next_edge_id(&mut self) -> EdgeId {
        self.next_edge += 1;
        EdgeId(format!("edge-{}", self.next_edge))
    }
}

/// Random v4 UUID ids, prefixed with the entity kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_node_id(&mut self) -> NodeId {
        NodeId(format!("node-{}", uuid::Uuid::new_v4()))
    }

    fn next_edge_id(&mut self) -> EdgeId {
        EdgeId(format!("edge-{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_monotonic() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_node_id(), "node-1");
        assert_eq!(ids.next_node_id(), "node-2");
        assert_eq!(ids.next_edge_id(), "edge-1");
        assert_eq!(ids.next_node_id(), "node-3");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = UuidIds;
        let a = ids.next_node_id();
        let b = ids.next_node_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node-"));
        assert!(ids.next_edge_id().as_str().starts_with("edge-"));
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = NodeId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: NodeId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(EdgeId::from("e1").to_string(), "e1");
    }
}
