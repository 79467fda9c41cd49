//! Shadow DOM
//!
//! Shadow roots are ordinary arena nodes whose parent is NONE and which
//! remember their host element.

use crate::node::{Node, NodeData};
use crate::operations::{DomError, DomResult};
use crate::{DomTree, NodeId};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl DomTree {
    /// Attach a shadow root to an element
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        match self.element(host) {
            None => return Err(DomError::InvalidNodeType),
            Some(elem) if elem.shadow_root.is_some() => return Err(DomError::ShadowRootExists),
            Some(_) => {}
        }
        let root = self.alloc(Node::new(NodeData::ShadowRoot { host, mode }));
        if let Some(elem) = self.element_mut(host) {
            elem.shadow_root = Some(root);
        }
        tracing::trace!("attached {:?} shadow root {} to {}", mode, root, host);
        Ok(root)
    }

    /// `element.shadowRoot`: only open roots are exposed
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.element(host)?.shadow_root?;
        match self.get(root)?.data {
            NodeData::ShadowRoot { mode: ShadowRootMode::Open, .. } => Some(root),
            _ => None,
        }
    }

    /// Whether `id` is a shadow root
    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::ShadowRoot { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_shadow_root() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        let root = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = tree.create_element("span");
        tree.append_child(root, inner).unwrap();

        assert_eq!(tree.shadow_root(host), Some(root));
        assert_eq!(tree.host_of(root), Some(host));
        assert_eq!(tree.root_of(inner), root);
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn test_closed_shadow_root_hidden() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.attach_shadow(host, ShadowRootMode::Closed).unwrap();

        assert_eq!(tree.shadow_root(host), None);
        assert_eq!(
            tree.attach_shadow(host, ShadowRootMode::Open),
            Err(DomError::ShadowRootExists)
        );
    }
}
