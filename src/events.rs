//! Change notifications and their dispatch queue.
//!
//! Every public operation queues the events it causes and flushes the queue
//! before returning. Listeners get `&mut NodeEditor`, so they may call back
//! into the editor; events raised that way are appended to the queue and
//! delivered after the current one, in order, to every listener.

use crate::editor::NodeEditor;
use crate::geometry::Point;
use crate::graph::{Edge, Node};
use crate::ids::{EdgeId, NodeId, PortId};
use crate::selection::SelectionSummary;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// One logical change to the graph, selection or view.
///
/// Serializes as `{"event": "node-added", "nodeId": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EditorEvent {
    EditorReady,
    #[serde(rename_all = "camelCase")]
    NodeAdded { node_id: NodeId, data: Node },
    #[serde(rename_all = "camelCase")]
    NodeRemoved { node_id: NodeId },
    #[serde(rename_all = "camelCase")]
    NodeMoved { node_id: NodeId, position: Point },
    #[serde(rename_all = "camelCase")]
    EdgeAdded {
        edge_id: EdgeId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        source_port_id: PortId,
        target_port_id: PortId,
    },
    #[serde(rename_all = "camelCase")]
    EdgeRemoved { edge_id: EdgeId },
    SelectionChanged(SelectionSummary),
    ZoomChanged { scale: f32 },
}

impl EditorEvent {
    pub(crate) fn edge_added(edge: &Edge) -> Self {
        EditorEvent::EdgeAdded {
            edge_id: edge.id.clone(),
            source_node_id: edge.source.clone(),
            target_node_id: edge.target.clone(),
            source_port_id: edge.source_port.clone(),
            target_port_id: edge.target_port.clone(),
        }
    }

    /// Wire name of the event, e.g. `"node-added"`
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::EditorReady => "editor-ready",
            EditorEvent::NodeAdded { .. } => "node-added",
            EditorEvent::NodeRemoved { .. } => "node-removed",
            EditorEvent::NodeMoved { .. } => "node-moved",
            EditorEvent::EdgeAdded { .. } => "edge-added",
            EditorEvent::EdgeRemoved { .. } => "edge-removed",
            EditorEvent::SelectionChanged(_) => "selection-changed",
            EditorEvent::ZoomChanged { .. } => "zoom-changed",
        }
    }
}

/// Receives editor notifications.
///
/// Implemented for any `FnMut(&mut NodeEditor, &EditorEvent)`.
pub trait EventListener {
    fn handle_event(&mut self, editor: &mut NodeEditor, event: &EditorEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&mut NodeEditor, &EditorEvent),
{
    fn handle_event(&mut self, editor: &mut NodeEditor, event: &EditorEvent) {
        self(editor, event)
    }
}

/// Handle returned by [`NodeEditor::on_event`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type BoxedListener = Box<dyn EventListener>;

/// Pending events and registered listeners.
#[derive(Default)]
pub(crate) struct EventQueue {
    pending: VecDeque<EditorEvent>,
    listeners: Vec<(ListenerId, BoxedListener)>,
    retired: HashSet<ListenerId>,
    next_id: u64,
    dispatching: bool,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: EditorEvent) {
        self.pending.push_back(event);
    }

    pub(crate) fn subscribe(&mut self, listener: BoxedListener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
        if self.dispatching {
            // The running dispatch holds the listener list; skip it there
            self.retired.insert(id);
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl NodeEditor {
    /// Deliver queued events to every listener.
    ///
    /// Reentrant calls (from inside a listener) return immediately; the outer
    /// call keeps draining until the queue is empty.
    pub(crate) fn flush_events(&mut self) {
        if self.events.dispatching {
            return;
        }
        self.events.dispatching = true;
        let mut listeners = std::mem::take(&mut self.events.listeners);

        while let Some(event) = self.events.pending.pop_front() {
            tracing::trace!(event = event.name(), "dispatch");
            for (id, listener) in listeners.iter_mut() {
                if !self.events.retired.contains(id) {
                    listener.handle_event(self, &event);
                }
            }
        }

        let retired = std::mem::take(&mut self.events.retired);
        listeners.retain(|(id, _)| !retired.contains(id));
        // Keep listeners that subscribed during dispatch, after the existing ones
        listeners.append(&mut self.events.listeners);
        self.events.listeners = listeners;
        self.events.dispatching = false;
    }
}
