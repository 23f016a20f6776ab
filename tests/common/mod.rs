//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use node_graph_canvas::{EditorEvent, NodeEditor};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every event an editor emits, in order.
#[derive(Default, Clone)]
pub struct EventTracker {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `editor`; the tracker and its clones see every event
    pub fn attach(&self, editor: &mut NodeEditor) {
        let events = self.events.clone();
        editor.on_event(move |_: &mut NodeEditor, e: &EditorEvent| {
            events.borrow_mut().push(e.clone());
        });
    }

    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Event names in order, e.g. `["edge-removed", "node-removed"]`
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.name() == name).count()
    }

    pub fn last(&self) -> Option<EditorEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
