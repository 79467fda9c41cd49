//! Insertion
//!
//! One primitive behind `append`, `prepend`, `after`, `before` and
//! `replace`. HTML is parsed per target. Nodes are moved when there is a
//! single target and copied per target otherwise, after which the source
//! nodes leave the tree. Copies get live scripts, moved nodes keep theirs.

use fos_dom::{InsertPosition, NodeId};
use fos_html::outer_html;

use crate::{Collection, QueryError, QueryResult};

/// Argument of the insertion methods
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    /// Markup parsed into a fresh fragment for every target
    Html(&'a str),
    /// A single node
    Node(NodeId),
    /// Every node of a collection
    Collection(&'a Collection),
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(html: &'a str) -> Self {
        Content::Html(html)
    }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(html: &'a String) -> Self {
        Content::Html(html)
    }
}

impl From<NodeId> for Content<'_> {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

impl<'a> From<&'a Collection> for Content<'a> {
    fn from(c: &'a Collection) -> Self {
        Content::Collection(c)
    }
}

impl Collection {
    /// Insert as last child of every node
    pub fn append<'a>(&self, content: impl Into<Content<'a>>) -> QueryResult<&Self> {
        self.insert(InsertPosition::Append, content.into())?;
        Ok(self)
    }

    /// Insert as first child of every node
    pub fn prepend<'a>(&self, content: impl Into<Content<'a>>) -> QueryResult<&Self> {
        self.insert(InsertPosition::Prepend, content.into())?;
        Ok(self)
    }

    /// Insert after every node
    pub fn after<'a>(&self, content: impl Into<Content<'a>>) -> QueryResult<&Self> {
        self.insert(InsertPosition::After, content.into())?;
        Ok(self)
    }

    /// Insert before every node
    pub fn before<'a>(&self, content: impl Into<Content<'a>>) -> QueryResult<&Self> {
        self.insert(InsertPosition::Before, content.into())?;
        Ok(self)
    }

    /// Put `content` in place of every node. The returned collection holds
    /// the inserted nodes; the receiver's nodes are detached.
    pub fn replace<'a>(&self, content: impl Into<Content<'a>>) -> QueryResult<Collection> {
        let inserted = self.insert(InsertPosition::Replace, content.into())?;
        Ok(self.derive(inserted))
    }

    /// Detach every node from the tree; the collection keeps them
    pub fn remove(&self) -> &Self {
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            doc.remove(node);
        }
        self
    }

    fn insert(&self, position: InsertPosition, content: Content<'_>) -> QueryResult<Vec<NodeId>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let method = position.method();
        self.check_content(content, method)?;

        let single = self.len() == 1;
        let mut inserted = Vec::new();
        match content {
            Content::Html(html) => {
                for &target in self.iter() {
                    let fragment = self.dom.parse_fragment(html)?;
                    inserted.extend(self.dom.document_mut().insert(position, target, fragment)?);
                }
            }
            Content::Collection(source) => {
                for &node in source.iter() {
                    for &target in self.iter() {
                        let mut doc = self.dom.document_mut();
                        if single {
                            inserted.extend(doc.insert(position, target, node)?);
                            continue;
                        }
                        // copies carry live scripts before they are connected
                        let copy = doc.tree_mut().clone_node(node, true)?;
                        let copy = doc.convert_scripts(copy)?;
                        inserted.extend(doc.insert(position, target, copy)?);
                    }
                }
                if !single {
                    source.remove();
                }
            }
            Content::Node(node) => {
                if single {
                    inserted.extend(self.dom.document_mut().insert(position, self[0], node)?);
                } else {
                    let html = outer_html(self.dom.document().tree(), node);
                    for &target in self.iter() {
                        let fragment = self.dom.parse_fragment(&html)?;
                        inserted.extend(self.dom.document_mut().insert(position, target, fragment)?);
                    }
                    self.dom.document_mut().remove(node);
                }
            }
        }
        tracing::trace!("{}: {} node(s) into {} target(s)", method, inserted.len(), self.len());
        Ok(inserted)
    }

    /// Nodes must belong to this document and be insertable
    fn check_content(&self, content: Content<'_>, method: &'static str) -> QueryResult<()> {
        let doc = self.dom.document();
        let insertable = |id: NodeId| doc.tree().get(id).is_some_and(|n| n.is_insertable());
        let valid = match content {
            Content::Html(_) => true,
            Content::Node(node) => insertable(node),
            Content::Collection(c) => c.dom.same(&self.dom) && c.iter().all(|&n| insertable(n)),
        };
        if valid {
            Ok(())
        } else {
            Err(QueryError::InvalidInsertionArgument { method })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Dom, QueryError};

    fn setup(html: &str) -> Dom {
        let dom = Dom::new();
        dom.query(dom.body()).unwrap().append(html).unwrap();
        dom
    }

    fn body_html(dom: &Dom) -> String {
        fos_html::inner_html(dom.document().tree(), dom.body())
    }

    #[test]
    fn test_html_positions() {
        let dom = setup(r#"<div id="t"><i></i></div>"#);
        let t = dom.query("#t").unwrap();

        t.append("<b>1</b>").unwrap();
        t.prepend("<b>0</b>").unwrap();
        t.before("<p>x</p>").unwrap();
        t.after("<p>y</p>").unwrap();

        assert_eq!(
            body_html(&dom),
            r#"<p>x</p><div id="t"><b>0</b><i></i><b>1</b></div><p>y</p>"#
        );
    }

    #[test]
    fn test_html_into_many_targets_is_independent() {
        let dom = setup("<div></div><div></div><div></div>");
        let divs = dom.query("div").unwrap();
        divs.append("<span>s</span>").unwrap();

        let spans = dom.query("span").unwrap();
        assert_eq!(spans.len(), 3);
        spans.eq(0).set_text("changed");
        assert_eq!(spans.eq(1).text().as_deref(), Some("s"));
    }

    #[test]
    fn test_collection_single_target_moves() {
        let dom = setup(r#"<ul id="a"><li>1</li></ul><ul id="b"></ul>"#);
        let item = dom.query("#a li").unwrap();
        dom.query("#b").unwrap().append(&item).unwrap();

        assert!(dom.query("#a li").unwrap().is_empty());
        assert_eq!(dom.query("#b li").unwrap().nodes(), item.nodes());
    }

    #[test]
    fn test_collection_many_targets_clones_and_removes_source() {
        let dom = setup(r#"<p class="src">x</p><div></div><div></div>"#);
        let src = dom.query(".src").unwrap();
        dom.query("div").unwrap().append(&src).unwrap();

        let copies = dom.query("div .src").unwrap();
        assert_eq!(copies.len(), 2);
        assert!(!copies.nodes().contains(&src[0]));
        assert!(dom.document().tree().parent(src[0]).is_none());
    }

    #[test]
    fn test_node_many_targets_round_trips_markup() {
        let dom = setup(r#"<em id="e">hi</em><div></div><div></div>"#);
        let em = dom.query("#e").unwrap()[0];
        dom.query("div").unwrap().append(em).unwrap();

        assert_eq!(dom.query("div em").unwrap().len(), 2);
        assert!(!dom.document().is_connected(em));
    }

    #[test]
    fn test_replace_returns_inserted() {
        let dom = setup("<i>a</i><i>b</i>");
        let old = dom.query("i").unwrap();
        let new = old.replace("<b>x</b><b>y</b>").unwrap();

        assert_eq!(new.len(), 4);
        assert_eq!(new.previous().map(|p| p.nodes()), Some(old.nodes()));
        assert!(old.iter().all(|&n| dom.document().tree().parent(n).is_none()));
        assert_eq!(body_html(&dom), "<b>x</b><b>y</b><b>x</b><b>y</b>");
    }

    #[test]
    fn test_empty_collection_is_noop() {
        let dom = setup("<p></p>");
        let none = dom.query("table").unwrap();
        assert!(none.append("<b></b>").is_ok());
        assert!(none.replace(dom.window()).unwrap().is_empty());
        assert_eq!(body_html(&dom), "<p></p>");
    }

    #[test]
    fn test_invalid_argument() {
        let dom = setup("<p></p>");
        let p = dom.query("p").unwrap();

        let err = p.append(dom.window()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInsertionArgument { method: "append" }));
        assert_eq!(
            p.replace(dom.root()).unwrap_err().to_string(),
            r#"Incorrect argument for "replaceWith(html)". It expects one string argument."#
        );
    }

    #[test]
    fn test_scripts_run_once_inserted() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let dom = setup("<div></div><div></div>");
        let ran = Rc::new(RefCell::new(Vec::new()));
        let log = ran.clone();
        dom.set_script_runner(move |_, source| log.borrow_mut().push(source.to_string()));

        dom.query("div").unwrap().append("<script>go()</script>").unwrap();
        assert_eq!(*ran.borrow(), vec!["go()", "go()"]);

        // detached fragments keep their scripts pending
        let frag = dom.fragment("<script>later()</script>").unwrap();
        assert_eq!(ran.borrow().len(), 2);
        dom.query("div").unwrap().eq(0).append(&frag).unwrap();
        assert_eq!(*ran.borrow(), vec!["go()", "go()", "later()"]);
    }

    #[test]
    fn test_fragment_scripts_run_once_per_target() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let dom = setup("<div></div><div></div>");
        let ran = Rc::new(RefCell::new(Vec::new()));
        let log = ran.clone();
        dom.set_script_runner(move |_, source| log.borrow_mut().push(source.to_string()));

        let frag = dom.fragment("<script>x()</script><p><script>y()</script></p>").unwrap();
        assert_eq!(frag.len(), 2);
        dom.query("div").unwrap().append(&frag).unwrap();

        assert_eq!(*ran.borrow(), vec!["x()", "x()", "y()", "y()"]);
        assert_eq!(dom.query("div script").unwrap().len(), 4);
    }

    #[test]
    fn test_remove_keeps_nodes() {
        let dom = setup("<p>a</p><p>b</p>");
        let p = dom.query("p").unwrap();
        p.remove();
        assert_eq!(p.len(), 2);
        assert!(dom.query("p").unwrap().is_empty());
    }
}
