use crate::ids::{EdgeId, NodeId};
use serde::ser::{Serialize, SerializeMap, Serializer};
use slint::{Model, SharedString, VecModel};
use std::collections::HashSet;

/// What a selection-changed notification reports.
///
/// A multi-node selection carries only its size; hosts that need the ids ask
/// the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSummary {
    None,
    Node(NodeId),
    Edge(EdgeId),
    Multiple(usize),
}

impl Serialize for SelectionSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            SelectionSummary::None => {
                map.serialize_entry("selected", &false)?;
            }
            SelectionSummary::Node(id) => {
                map.serialize_entry("selected", &true)?;
                map.serialize_entry("type", "node")?;
                map.serialize_entry("nodeId", id)?;
            }
            SelectionSummary::Edge(id) => {
                map.serialize_entry("selected", &true)?;
                map.serialize_entry("type", "edge")?;
                map.serialize_entry("edgeId", id)?;
            }
            SelectionSummary::Multiple(count) => {
                map.serialize_entry("selected", &true)?;
                map.serialize_entry("type", "multiple")?;
                map.serialize_entry("count", count)?;
            }
        }
        map.end()
    }
}

/// How a pointer press on a node resolved against the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Modifier press flipped the node's flag; no drag follows
    Toggled,
    /// Node is now the only selection; `changed` is false if it already was
    Selected { changed: bool },
    /// Node belongs to a multi-selection, which is left untouched
    KeptGroup,
}

/// Selected nodes, or a single selected edge. Never both.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    nodes: HashSet<NodeId>,
    edge: Option<EdgeId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a press on a node.
    ///
    /// With `toggle` (Shift or Ctrl/Cmd) the node's flag is flipped. Without
    /// it, a member of a multi-selection keeps the group; anything else
    /// becomes the sole selection.
    pub fn handle_press(&mut self, id: &NodeId, toggle: bool) -> PressOutcome {
        if toggle {
            self.toggle_node(id);
            PressOutcome::Toggled
        } else if self.nodes.len() > 1 && self.nodes.contains(id) {
            PressOutcome::KeptGroup
        } else {
            PressOutcome::Selected {
                changed: self.select_node(id),
            }
        }
    }

    /// Empty both selection domains. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.is_empty();
        self.nodes.clear();
        self.edge = None;
        changed
    }

    /// Exclusive single-node select. Returns true if the selection changed.
    pub fn select_node(&mut self, id: &NodeId) -> bool {
        if self.edge.is_none() && self.nodes.len() == 1 && self.nodes.contains(id) {
            return false;
        }
        self.edge = None;
        self.nodes.clear();
        self.nodes.insert(id.clone());
        true
    }

    /// Add or remove one node without disturbing the others
    pub fn toggle_node(&mut self, id: &NodeId) {
        self.edge = None;
        if !self.nodes.remove(id) {
            self.nodes.insert(id.clone());
        }
    }

    /// Replace the selection with the given nodes. Returns true if it changed.
    pub fn select_nodes<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        let next: HashSet<NodeId> = ids.into_iter().collect();
        if self.edge.is_none() && next == self.nodes {
            return false;
        }
        self.edge = None;
        self.nodes = next;
        true
    }

    /// Exclusive edge select. Returns true if the selection changed.
    pub fn select_edge(&mut self, id: &EdgeId) -> bool {
        if self.nodes.is_empty() && self.edge.as_ref() == Some(id) {
            return false;
        }
        self.nodes.clear();
        self.edge = Some(id.clone());
        true
    }

    /// Forget a node that left the graph. Returns true if it was selected.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        self.nodes.remove(id)
    }

    /// Forget an edge that left the graph. Returns true if it was selected.
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        if self.edge.as_ref() == Some(id) {
            self.edge = None;
            true
        } else {
            false
        }
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn selected_edge(&self) -> Option<&EdgeId> {
        self.edge.as_ref()
    }

    /// Selected node ids in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edge.is_none()
    }

    pub fn summary(&self) -> SelectionSummary {
        if let Some(edge) = &self.edge {
            return SelectionSummary::Edge(edge.clone());
        }
        match self.nodes.len() {
            0 => SelectionSummary::None,
            1 => self
                .nodes
                .iter()
                .next()
                .map_or(SelectionSummary::None, |id| SelectionSummary::Node(id.clone())),
            n => SelectionSummary::Multiple(n),
        }
    }

    /// Sync the selected node ids to a Slint VecModel, sorted
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        let mut ids: Vec<&NodeId> = self.nodes.iter().collect();
        ids.sort();
        model.set_vec(
            ids.into_iter()
                .map(|id| SharedString::from(id.as_str()))
                .collect::<Vec<_>>(),
        );
    }

    /// Replace the node selection from any Slint Model of ids
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = SharedString>) {
        let ids = (0..model.row_count())
            .filter_map(|i| model.row_data(i))
            .map(|s| NodeId::from(s.as_str()));
        self.select_nodes(ids);
    }
}
