//! Traversal
//!
//! Every operation returns a new collection whose `previous()` is the
//! receiver.

use fos_css::{closest, query_all};
use fos_dom::NodeId;

use crate::Collection;

/// Argument of [`Collection::filter`]
pub enum Filter<'a> {
    /// Nodes matching a CSS selector
    Css(&'a str),
    /// Only this node
    Node(NodeId),
    /// Nodes for which the predicate holds
    Predicate(&'a dyn Fn(NodeId) -> bool),
}

impl<'a> From<&'a str> for Filter<'a> {
    fn from(s: &'a str) -> Self {
        Filter::Css(s)
    }
}

impl From<NodeId> for Filter<'_> {
    fn from(node: NodeId) -> Self {
        Filter::Node(node)
    }
}

impl<'a, F: Fn(NodeId) -> bool> From<&'a F> for Filter<'a> {
    fn from(f: &'a F) -> Self {
        Filter::Predicate(f)
    }
}

impl Collection {
    /// Descendants matching `selector`, per source node in document order,
    /// concatenated in source order
    pub fn find(&self, selector: &str) -> Collection {
        let Some(list) = self.selector_or_warn(selector) else {
            return self.derive(Vec::new());
        };
        let doc = self.dom.document();
        let tree = doc.tree();
        let nodes = self.iter()
            .filter(|&&n| tree.get(n).is_some_and(|node| node.is_queryable()))
            .flat_map(|&n| query_all(tree, n, &list))
            .collect();
        drop(doc);
        self.derive(nodes)
    }

    /// Nodes accepted by `filter`
    pub fn filter<'a>(&self, filter: impl Into<Filter<'a>>) -> Collection {
        let nodes = match filter.into() {
            Filter::Css(selector) => {
                let Some(list) = self.selector_or_warn(selector) else {
                    return self.derive(Vec::new());
                };
                let doc = self.dom.document();
                self.iter().copied().filter(|&n| list.matches(doc.tree(), n)).collect()
            }
            Filter::Node(node) => self.iter().copied().filter(|&n| n == node).collect(),
            // the predicate runs without a document borrow held
            Filter::Predicate(pred) => self.iter().copied().filter(|&n| pred(n)).collect(),
        };
        self.derive(nodes)
    }

    /// Next element siblings
    pub fn next(&self) -> Collection {
        let doc = self.dom.document();
        let nodes = self.iter().filter_map(|&n| doc.tree().next_element_sibling(n)).collect();
        drop(doc);
        self.derive(nodes)
    }

    /// Previous element siblings
    pub fn prev(&self) -> Collection {
        let doc = self.dom.document();
        let nodes = self.iter().filter_map(|&n| doc.tree().previous_element_sibling(n)).collect();
        drop(doc);
        self.derive(nodes)
    }

    /// Open shadow roots, optionally narrowed with `find(selector)`
    pub fn shadow(&self, selector: Option<&str>) -> Collection {
        let doc = self.dom.document();
        let roots = self.iter().filter_map(|&n| doc.tree().shadow_root(n)).collect();
        drop(doc);
        let roots = self.derive(roots);
        match selector {
            Some(s) => roots.find(s),
            None => roots,
        }
    }

    /// Nearest inclusive ancestor matching `selector`, per node
    pub fn closest(&self, selector: &str) -> Collection {
        let Some(list) = self.selector_or_warn(selector) else {
            return self.derive(Vec::new());
        };
        let doc = self.dom.document();
        let nodes = self.iter().filter_map(|&n| closest(doc.tree(), n, &list)).collect();
        drop(doc);
        self.derive(nodes)
    }

    /// Host of the shadow tree each node lives in, or the top of its tree
    /// when there is none. With `all`, keep climbing through nested hosts.
    pub fn host(&self, all: bool) -> Collection {
        let doc = self.dom.document();
        let tree = doc.tree();
        let mut nodes = Vec::new();
        for &node in self.iter() {
            let mut cur = node;
            loop {
                let top = tree.root_of(cur);
                match tree.host_of(top) {
                    Some(host) => {
                        nodes.push(host);
                        if !all {
                            break;
                        }
                        cur = host;
                    }
                    None => {
                        nodes.push(top);
                        break;
                    }
                }
            }
        }
        drop(doc);
        self.derive(nodes)
    }

    /// Parents, optionally filtered by `selector`
    pub fn parent(&self, selector: Option<&str>) -> Collection {
        self.collect_parents(selector, true)
    }

    /// All ancestors (nearest first, de-duplicated across nodes), optionally
    /// filtered by `selector`
    pub fn parents(&self, selector: Option<&str>) -> Collection {
        self.collect_parents(selector, false)
    }

    fn collect_parents(&self, selector: Option<&str>, first_only: bool) -> Collection {
        let doc = self.dom.document();
        let tree = doc.tree();
        let mut nodes: Vec<NodeId> = Vec::new();
        for &node in self.iter() {
            let mut cur = tree.parent(node);
            while let Some(p) = cur {
                if !nodes.contains(&p) {
                    nodes.push(p);
                }
                if first_only {
                    break;
                }
                cur = tree.parent(p);
            }
        }
        drop(doc);

        let parents = self.derive(nodes);
        match selector {
            Some(s) => parents.filter(s),
            None => parents,
        }
    }
}
