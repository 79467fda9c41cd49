//! Per-node auxiliary state
//!
//! Side-table keyed by node identity for data that callers attach to nodes
//! they do not own: scoped event registrations, the display value saved by a
//! hide, and expando properties. Entries live as long as the document.

use std::collections::HashMap;

use crate::events::{EventCallback, ListenerId, ListenerOptions};
use crate::NodeId;

/// A scoped event registration; always backed by a live listener
#[derive(Debug, Clone)]
pub struct Registration {
    /// Lowercase event name
    pub event: String,
    /// Optional tag from `event.scope`
    pub scope: Option<String>,
    /// The listener attached for this registration
    pub listener: ListenerId,
    /// The callback supplied by the caller
    pub handler: EventCallback,
    /// The callback that was attached (the delegating wrapper, if any)
    pub callback: EventCallback,
    pub options: ListenerOptions,
}

/// Auxiliary data for one node
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    pub registrations: Vec<Registration>,
    pub prev_display: Option<String>,
    pub expando: HashMap<String, serde_json::Value>,
}

impl NodeState {
    fn is_empty(&self) -> bool {
        self.registrations.is_empty() && self.prev_display.is_none() && self.expando.is_empty()
    }
}

/// Side-table of [`NodeState`]
#[derive(Debug, Default)]
pub struct NodeStateTable {
    states: HashMap<NodeId, NodeState>,
}

impl NodeStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a node, if any was recorded
    pub fn get(&self, node: NodeId) -> Option<&NodeState> {
        self.states.get(&node)
    }

    /// Mutable state, created on demand
    pub fn entry(&mut self, node: NodeId) -> &mut NodeState {
        self.states.entry(node).or_default()
    }

    /// Drop the entry once it carries nothing
    pub fn prune(&mut self, node: NodeId) {
        if self.states.get(&node).is_some_and(NodeState::is_empty) {
            self.states.remove(&node);
        }
    }

    /// Forget registrations backed by `listener`
    pub fn forget_listener(&mut self, node: NodeId, listener: ListenerId) {
        if let Some(state) = self.states.get_mut(&node) {
            state.registrations.retain(|r| r.listener != listener);
        }
        self.prune(node);
    }

    /// Number of nodes with state
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
