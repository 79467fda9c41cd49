//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree with the host services a scripting layer expects:
//! shadow roots, class lists, datasets, event listeners and dispatch, and a
//! side-table for per-node state owned by callers.

mod node;
mod tree;
mod document;
mod operations;
mod classlist;
mod dataset;
mod shadow;
mod node_state;
pub mod events;

pub use node::{Node, NodeData, ElementData, Attribute, ScriptFlags};
pub use tree::{DomTree, Children};
pub use document::{Document, InsertPosition, ReadyState, ScriptRunner};
pub use operations::{DomError, DomResult};
pub use classlist::DOMTokenList;
pub use dataset::{DOMStringMap, to_camel_case, to_kebab_case};
pub use shadow::ShadowRootMode;
pub use node_state::{NodeState, NodeStateTable, Registration};
pub use events::{
    dispatch_event, Event, EventCallback, EventInit, EventKind, EventPhase, KeyboardData,
    ListenerId, ListenerOptions, MouseData,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node of a [`Document`])
    pub const ROOT: NodeId = NodeId(0);
    /// Absent link
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
