//! Collection - ordered node list with chainable operations
//!
//! Construction normalizes every accepted input shape into one node
//! sequence. Traversals build new collections pointing back at the one they
//! came from; mutations work on the nodes and hand back the same collection.

use std::ops::Index;
use std::rc::Rc;

use fos_css::query_all;
use fos_dom::NodeId;

use crate::{Dom, QueryError, QueryResult};

/// Input accepted when building a collection
#[derive(Debug, Clone)]
pub enum Selector<'a> {
    /// CSS selector resolved against the context
    Css(&'a str),
    /// A single node
    Node(NodeId),
    /// The document's window
    Window,
    /// Nodes of another collection
    Collection(&'a Collection),
    /// Nodes in the given order
    Nodes(Vec<NodeId>),
    /// Empty collection
    None,
}

impl<'a> From<&'a str> for Selector<'a> {
    fn from(s: &'a str) -> Self {
        Selector::Css(s)
    }
}

impl<'a> From<&'a String> for Selector<'a> {
    fn from(s: &'a String) -> Self {
        Selector::Css(s)
    }
}

impl From<NodeId> for Selector<'_> {
    fn from(node: NodeId) -> Self {
        Selector::Node(node)
    }
}

impl From<Option<NodeId>> for Selector<'_> {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(Selector::None, Selector::Node)
    }
}

impl<'a> From<&'a Collection> for Selector<'a> {
    fn from(c: &'a Collection) -> Self {
        Selector::Collection(c)
    }
}

impl From<Vec<NodeId>> for Selector<'_> {
    fn from(nodes: Vec<NodeId>) -> Self {
        Selector::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Selector<'_> {
    fn from(nodes: &[NodeId]) -> Self {
        Selector::Nodes(nodes.to_vec())
    }
}

/// Ordered sequence of nodes of one document
#[derive(Clone)]
pub struct Collection {
    pub(crate) dom: Dom,
    nodes: Vec<NodeId>,
    context: NodeId,
    previous: Option<Rc<Collection>>,
}

impl Collection {
    /// Normalize `selector` into a collection
    pub(crate) fn build(
        dom: &Dom,
        selector: Selector<'_>,
        context: Option<NodeId>,
    ) -> QueryResult<Self> {
        let context = context.unwrap_or_else(|| dom.root());
        let nodes = {
            let doc = dom.document();
            let tree = doc.tree();
            let owned = |id: NodeId| {
                if tree.contains(id) {
                    Ok(id)
                } else {
                    Err(QueryError::InvalidSelector(id.to_string()))
                }
            };

            match selector {
                Selector::Css(text) => {
                    let queryable = tree.get(context).is_some_and(|n| n.is_queryable());
                    if !queryable {
                        return Err(QueryError::InvalidContext);
                    }
                    let list = dom.selector(text)?;
                    query_all(tree, context, &list)
                }
                Selector::Node(id) => vec![owned(id)?],
                Selector::Window => vec![doc.window()],
                Selector::Collection(c) => {
                    if !c.dom.same(dom) {
                        return Err(QueryError::InvalidSelector("collection of another document".into()));
                    }
                    c.nodes.clone()
                }
                Selector::Nodes(ids) => ids.into_iter().map(owned).collect::<QueryResult<Vec<_>>>()?,
                Selector::None => Vec::new(),
            }
        };

        Ok(Self { dom: dom.clone(), nodes, context, previous: None })
    }

    /// New collection derived from this one
    pub(crate) fn derive(&self, nodes: Vec<NodeId>) -> Collection {
        Collection {
            dom: self.dom.clone(),
            nodes,
            context: self.context,
            previous: Some(Rc::new(self.clone())),
        }
    }

    /// The document handle
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.nodes.iter()
    }

    /// Root used for selector lookups
    pub fn context(&self) -> NodeId {
        self.context
    }

    /// The collection this one was produced from
    pub fn previous(&self) -> Option<&Collection> {
        self.previous.as_deref()
    }

    /// Node at `index`; negative indexes count from the end
    pub fn get(&self, index: isize) -> Option<NodeId> {
        let index = if index < 0 {
            self.nodes.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.nodes.get(index).copied()
    }

    /// First node
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Collection with only the node at `index` (empty when out of range)
    pub fn eq(&self, index: isize) -> Collection {
        self.derive(self.get(index).into_iter().collect())
    }

    /// Call `f(node, index, collection)` for every node
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(NodeId, usize, &Collection),
    {
        for (i, &node) in self.nodes.iter().enumerate() {
            f(node, i, self);
        }
        self
    }

    /// Pass the collection to `f`; returns what `f` returns, or this collection
    pub fn then<F>(&self, f: F) -> Collection
    where
        F: FnOnce(&Collection) -> Option<Collection>,
    {
        f(self).unwrap_or_else(|| self.clone())
    }

    /// New collection with `more` appended
    pub fn add<'a>(&self, more: impl Into<Selector<'a>>) -> QueryResult<Collection> {
        let more = Collection::build(&self.dom, more.into(), Some(self.context))?;
        let mut nodes = self.nodes.clone();
        nodes.extend_from_slice(&more.nodes);
        Ok(self.derive(nodes))
    }

    /// Resolve a selector for traversal filters; malformed selectors are
    /// logged and match nothing
    pub(crate) fn selector_or_warn(&self, text: &str) -> Option<Rc<fos_css::SelectorList>> {
        match self.dom.selector(text) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}

impl Index<usize> for Collection {
    type Output = NodeId;

    fn index(&self, index: usize) -> &NodeId {
        &self.nodes[index]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("nodes", &self.nodes)
            .field("context", &self.context)
            .finish()
    }
}
