//! DOM Tree (arena-based allocation)
//!
//! All nodes of a document live in one `Vec`; links between them are
//! `NodeId`s. Detached nodes stay in the arena and can be re-inserted.

use crate::node::{Attribute, ElementData, Node, NodeData};
use crate::operations::{DomError, DomResult};
use crate::NodeId;

/// Arena-based DOM tree
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new empty DOM tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Move a node into the arena
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Whether the id refers to a node of this tree
    pub fn contains(&self, id: NodeId) -> bool {
        id.is_valid() && (id.0 as usize) < self.nodes.len()
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(Node::element(tag_name))
    }

    /// Create a detached element with attributes
    pub fn create_element_with_attrs(&mut self, tag_name: &str, attrs: Vec<Attribute>) -> NodeId {
        let mut data = ElementData::new(tag_name);
        for attr in attrs {
            data.set_attr(&attr.name, attr.value);
        }
        self.alloc(Node::new(NodeData::Element(data)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.to_string())))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(Node::new(NodeData::Fragment))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    /// Parent node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate child ids in order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Child elements only
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&c| self.element(c).is_some())
    }

    /// Next sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.next_sibling;
        while let Some(node) = self.get(cur) {
            if node.is_element() {
                return Some(cur);
            }
            cur = node.next_sibling;
        }
        None
    }

    /// Previous sibling that is an element
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.prev_sibling;
        while let Some(node) = self.get(cur) {
            if node.is_element() {
                return Some(cur);
            }
            cur = node.prev_sibling;
        }
        None
    }

    /// Ancestors, nearest first. Stops at the top of the node's own tree
    /// (a shadow root does not continue into its host).
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let start = stack.len();
            stack.extend(self.children(node));
            stack[start..].reverse();
        }
        out
    }

    /// Top of the parent chain (document, fragment, shadow root or detached node)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    /// Host element if `id` is a shadow root
    pub fn host_of(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.data {
            NodeData::ShadowRoot { host, .. } => Some(host),
            _ => None,
        }
    }

    /// Parent, stepping from a shadow root to its host
    pub fn parent_or_host(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.host_of(id))
    }

    /// `ancestor` is `node` or one of its (host-including) ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent_or_host(n);
        }
        false
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Remove a node from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Insert `child` into `parent` before `reference` (append when `None`).
    /// A fragment child is replaced by its children. Returns the nodes that
    /// were actually inserted.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<Vec<NodeId>> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(DomError::NotFound);
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotAChild);
            }
        }
        let insertable = self.get(child).is_some_and(Node::is_insertable);
        if !insertable || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        let moved = self.expand_fragment(child);
        for &node in &moved {
            if Some(node) == reference {
                continue;
            }
            self.detach(node);
            self.link_before(parent, node, reference);
        }
        Ok(moved)
    }

    /// Append as last child
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<Vec<NodeId>> {
        self.insert_before(parent, child, None)
    }

    /// Insert as first child
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<Vec<NodeId>> {
        let first = self.get(parent).map(|n| n.first_child).filter(|c| c.is_valid());
        self.insert_before(parent, child, first)
    }

    /// Insert as the previous sibling of `node`
    pub fn insert_sibling_before(&mut self, node: NodeId, child: NodeId) -> DomResult<Vec<NodeId>> {
        let parent = self.parent(node).ok_or(DomError::NotAChild)?;
        self.insert_before(parent, child, Some(node))
    }

    /// Insert as the next sibling of `node`
    pub fn insert_after(&mut self, node: NodeId, child: NodeId) -> DomResult<Vec<NodeId>> {
        let parent = self.parent(node).ok_or(DomError::NotAChild)?;
        let next = self.get(node).map(|n| n.next_sibling).filter(|n| n.is_valid());
        self.insert_before(parent, child, next)
    }

    /// Put `replacement` where `node` is and detach `node`
    pub fn replace_with(&mut self, node: NodeId, replacement: NodeId) -> DomResult<Vec<NodeId>> {
        if node == replacement {
            return Ok(vec![node]);
        }
        let parent = self.parent(node).ok_or(DomError::NotAChild)?;
        let inserted = self.insert_before(parent, replacement, Some(node))?;
        self.detach(node);
        Ok(inserted)
    }

    /// Detach every child of `id`
    pub fn remove_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
    }

    /// Copy a node (and its subtree when `deep`). Shadow roots are not copied.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let mut data = self.get(id).ok_or(DomError::NotFound)?.data.clone();
        match &mut data {
            NodeData::Element(elem) => elem.shadow_root = None,
            NodeData::Document | NodeData::Window | NodeData::ShadowRoot { .. } => {
                return Err(DomError::InvalidNodeType);
            }
            _ => {}
        }
        let copy = self.alloc(Node::new(data));
        if deep {
            let children: Vec<NodeId> = self.children(id).collect();
            for child in children {
                let child_copy = self.clone_node(child, true)?;
                self.link_before(copy, child_copy, None);
            }
        }
        Ok(copy)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) | Some(NodeData::Comment(t)) => t.clone(),
            Some(_) => self.descendants(id)
                .into_iter()
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        match self.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(t)) | Some(NodeData::Comment(t)) => {
                *t = text.to_string();
            }
            Some(_) => {
                self.remove_children(id);
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.link_before(id, node, None);
                }
            }
            None => {}
        }
    }

    fn expand_fragment(&self, id: NodeId) -> Vec<NodeId> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Fragment) => self.children(id).collect(),
            _ => vec![id],
        }
    }

    /// Link a detached node; `reference` must be a child of `parent`
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let prev = match reference {
            Some(r) => self.get(r).map(|n| n.prev_sibling).unwrap_or(NodeId::NONE),
            None => self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE),
        };
        let next = reference.unwrap_or(NodeId::NONE);

        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = next;
        }
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = child;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = child;
                }
            }
        }
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.tree.get(self.next)?;
        let id = self.next;
        self.next = node.next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(tree: &mut DomTree, n: usize) -> (NodeId, Vec<NodeId>) {
        let ul = tree.create_element("ul");
        let items: Vec<NodeId> = (0..n)
            .map(|_| {
                let li = tree.create_element("li");
                tree.append_child(ul, li).unwrap();
                li
            })
            .collect();
        (ul, items)
    }

    #[test]
    fn test_append_and_children() {
        let mut tree = DomTree::new();
        let (ul, items) = list(&mut tree, 3);

        assert_eq!(tree.children(ul).collect::<Vec<_>>(), items);
        assert_eq!(tree.parent(items[1]), Some(ul));
        assert_eq!(tree.next_element_sibling(items[0]), Some(items[1]));
        assert_eq!(tree.previous_element_sibling(items[0]), None);
    }

    #[test]
    fn test_prepend_and_insert_after() {
        let mut tree = DomTree::new();
        let (ul, items) = list(&mut tree, 2);
        let first = tree.create_element("li");
        let middle = tree.create_element("li");

        tree.prepend_child(ul, first).unwrap();
        tree.insert_after(items[0], middle).unwrap();

        assert_eq!(
            tree.children(ul).collect::<Vec<_>>(),
            vec![first, items[0], middle, items[1]]
        );
    }

    #[test]
    fn test_detach_relinks_siblings() {
        let mut tree = DomTree::new();
        let (ul, items) = list(&mut tree, 3);

        tree.detach(items[1]);

        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![items[0], items[2]]);
        assert_eq!(tree.parent(items[1]), None);
        tree.detach(items[1]);
    }

    #[test]
    fn test_fragment_children_are_moved() {
        let mut tree = DomTree::new();
        let (ul, _) = list(&mut tree, 0);
        let frag = tree.create_fragment();
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        tree.append_child(frag, a).unwrap();
        tree.append_child(frag, b).unwrap();

        let moved = tree.append_child(ul, frag).unwrap();

        assert_eq!(moved, vec![a, b]);
        assert_eq!(tree.children(frag).count(), 0);
        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_hierarchy_error() {
        let mut tree = DomTree::new();
        let (ul, items) = list(&mut tree, 1);

        assert_eq!(tree.append_child(items[0], ul), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = DomTree::new();
        let root = tree.create_element("div");
        let a = tree.create_element("a");
        let a1 = tree.create_element("b");
        let b = tree.create_element("c");
        tree.append_child(root, a).unwrap();
        tree.append_child(a, a1).unwrap();
        tree.append_child(root, b).unwrap();

        assert_eq!(tree.descendants(root), vec![a, a1, b]);
        assert_eq!(tree.ancestors(a1), vec![a, root]);
        assert_eq!(tree.root_of(a1), root);
    }

    #[test]
    fn test_clone_and_text() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        tree.set_text_content(p, "hello");

        let copy = tree.clone_node(p, true).unwrap();
        tree.set_text_content(copy, "bye");

        assert_eq!(tree.text_content(p), "hello");
        assert_eq!(tree.text_content(copy), "bye");
    }

    #[test]
    fn test_replace_with() {
        let mut tree = DomTree::new();
        let (ul, items) = list(&mut tree, 2);
        let new = tree.create_element("li");

        tree.replace_with(items[0], new).unwrap();

        assert_eq!(tree.children(ul).collect::<Vec<_>>(), vec![new, items[1]]);
        assert_eq!(tree.parent(items[0]), None);
    }
}
