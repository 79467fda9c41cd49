//! Document - High-level document API
//!
//! Owns the tree together with everything attached to its nodes from the
//! outside: event listeners, the auxiliary side-table and the script hook.

use crate::events::{EventCallback, EventTargetMap, ListenerId, ListenerOptions};
use crate::node::{Node, NodeData};
use crate::node_state::{NodeState, NodeStateTable, Registration};
use crate::operations::{DomError, DomResult};
use crate::{DomTree, NodeId};

/// Callback used to execute `<script>` elements once they are connected
pub type ScriptRunner = Box<dyn FnMut(NodeId, &str)>;

/// document.readyState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// Where to put nodes relative to a target node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Last child (`append`)
    Append,
    /// First child (`prepend`)
    Prepend,
    /// Previous sibling (`before`)
    Before,
    /// Next sibling (`after`)
    After,
    /// In place of the target (`replaceWith`)
    Replace,
}

impl InsertPosition {
    /// DOM method name
    pub fn method(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Before => "before",
            Self::After => "after",
            Self::Replace => "replaceWith",
        }
    }
}

/// HTML Document
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    root: NodeId,
    window: NodeId,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    ready_state: ReadyState,
    listeners: EventTargetMap,
    state: NodeStateTable,
    scripting_enabled: bool,
    script_runner: Option<ScriptRunner>,
}

impl Document {
    /// Create a new document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");

        // freshly created nodes cannot violate the hierarchy
        let _ = doc.tree.append_child(doc.root, html);
        let _ = doc.tree.append_child(html, head);
        let _ = doc.tree.append_child(html, body);

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        let mut tree = DomTree::new();
        let root = tree.alloc(Node::new(NodeData::Document));
        let window = tree.alloc(Node::new(NodeData::Window));
        Self {
            tree,
            url: url.to_string(),
            root,
            window,
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            ready_state: ReadyState::Loading,
            listeners: EventTargetMap::new(),
            state: NodeStateTable::new(),
            scripting_enabled: true,
            script_runner: None,
        }
    }

    /// Locate `<html>`, `<head>` and `<body>` after the tree was built
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.element_children(parent).find(|&c| tree.tag_name(c) == Some(tag))
        };
        self.html_element = find(&self.tree, self.root, "html").unwrap_or(NodeId::NONE);
        self.head_element = find(&self.tree, self.html_element, "head").unwrap_or(NodeId::NONE);
        self.body_element = find(&self.tree, self.html_element, "body").unwrap_or(NodeId::NONE);
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Window (event target only)
    pub fn window(&self) -> NodeId {
        self.window
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.tree.element_children(self.head_element)
            .find(|&c| self.tree.tag_name(c) == Some("title"))
            .map(|t| self.tree.text_content(t).trim().to_string())
            .unwrap_or_default()
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.root)
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Connected nodes reach the document through parents and shadow hosts
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cur = node;
        while let Some(next) = self.tree.parent_or_host(cur) {
            cur = next;
        }
        cur == self.root
    }

    /// Propagation path: target, ancestors (crossing into shadow hosts when
    /// `composed`), then the window if the document was reached.
    pub fn event_path(&self, target: NodeId, composed: bool) -> Vec<NodeId> {
        let mut path = vec![target];
        let mut cur = target;
        loop {
            let next = if composed {
                self.tree.parent_or_host(cur)
            } else {
                self.tree.parent(cur)
            };
            match next {
                Some(n) => {
                    path.push(n);
                    cur = n;
                }
                None => break,
            }
        }
        if cur == self.root && target != self.window {
            path.push(self.window);
        }
        path
    }

    // ------------------------------------------------------------------
    // Mutation with script execution
    // ------------------------------------------------------------------

    /// Insert `node` relative to `target`; returns the inserted nodes
    /// (fragment children when `node` is a fragment)
    pub fn insert(&mut self, position: InsertPosition, target: NodeId, node: NodeId) -> DomResult<Vec<NodeId>> {
        let inserted = match position {
            InsertPosition::Append => self.tree.append_child(target, node)?,
            InsertPosition::Prepend => self.tree.prepend_child(target, node)?,
            InsertPosition::Before => self.tree.insert_sibling_before(target, node)?,
            InsertPosition::After => self.tree.insert_after(target, node)?,
            InsertPosition::Replace => self.tree.replace_with(target, node)?,
        };
        for &n in &inserted {
            self.run_scripts(n);
        }
        Ok(inserted)
    }

    /// node.remove()
    pub fn remove(&mut self, node: NodeId) {
        self.tree.detach(node);
    }

    pub fn set_scripting_enabled(&mut self, enabled: bool) {
        self.scripting_enabled = enabled;
    }

    /// Install the callback that executes connected scripts
    pub fn set_script_runner<F>(&mut self, runner: F)
    where
        F: FnMut(NodeId, &str) + 'static,
    {
        self.script_runner = Some(Box::new(runner));
    }

    /// Run every connected, non-inert script in the subtree that has not
    /// started yet
    pub fn run_scripts(&mut self, root: NodeId) {
        if !self.is_connected(root) {
            return;
        }
        let mut nodes = vec![root];
        nodes.extend(self.tree.descendants(root));

        for node in nodes {
            let pending = self.tree.element(node)
                .is_some_and(|e| e.is("script") && !e.script.inert && !e.script.already_started);
            if !pending {
                continue;
            }
            if let Some(elem) = self.tree.element_mut(node) {
                elem.script.already_started = true;
            }
            let source = self.tree.text_content(node);
            if !self.scripting_enabled {
                tracing::warn!("scripting disabled, skipping script {}", node);
                continue;
            }
            match self.script_runner.as_mut() {
                Some(runner) => {
                    tracing::debug!("running script {} ({} bytes)", node, source.len());
                    runner(node, &source);
                }
                None => tracing::debug!("no script runner, script {} ignored", node),
            }
        }
    }

    /// Replace inert scripts in the subtree with live copies (same tag name,
    /// text and attributes). Returns the node now standing where `node` was.
    pub fn convert_scripts(&mut self, node: NodeId) -> DomResult<NodeId> {
        let mut top = node;
        let mut scripts: Vec<NodeId> = self.tree.descendants(node)
            .into_iter()
            .filter(|&n| self.tree.element(n).is_some_and(|e| e.is("script")))
            .collect();
        if self.tree.element(node).is_some_and(|e| e.is("script")) {
            scripts.insert(0, node);
        }

        for script in scripts {
            let live = self.live_copy(script)?;
            if self.tree.parent(script).is_some() {
                self.insert(InsertPosition::Replace, script, live)?;
            }
            if script == node {
                top = live;
            }
        }
        Ok(top)
    }

    fn live_copy(&mut self, script: NodeId) -> DomResult<NodeId> {
        let elem = self.tree.element(script).ok_or(DomError::InvalidNodeType)?;
        let tag = elem.tag_name.clone();
        let attrs = elem.attrs.clone();
        let text = self.tree.text_content(script);

        let live = self.tree.create_element_with_attrs(&tag, attrs);
        self.tree.set_text_content(live, &text);
        Ok(live)
    }

    // ------------------------------------------------------------------
    // Listeners and side-table
    // ------------------------------------------------------------------

    pub fn listeners(&self) -> &EventTargetMap {
        &self.listeners
    }

    /// addEventListener
    pub fn add_event_listener(&mut self, node: NodeId, event_type: &str, callback: EventCallback, options: ListenerOptions) -> ListenerId {
        self.listeners.add(node, event_type, callback, options)
    }

    /// Remove a listener and any registration that refers to it
    pub fn remove_event_listener(&mut self, node: NodeId, id: ListenerId) -> bool {
        let removed = self.listeners.remove(node, id);
        self.state.forget_listener(node, id);
        removed
    }

    /// Attach `callback` and record it in the side-table in one step.
    /// `handler` is what the caller supplied; `callback` may wrap it.
    pub fn register(
        &mut self,
        node: NodeId,
        event: &str,
        scope: Option<String>,
        handler: EventCallback,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> ListenerId {
        let listener = self.listeners.add(node, event, callback.clone(), options);
        self.state.entry(node).registrations.push(Registration {
            event: event.to_string(),
            scope,
            listener,
            handler,
            callback,
            options,
        });
        tracing::debug!("registered {} listener on {}", event, node);
        listener
    }

    /// Remove every registration matching `pred` (newest first) together
    /// with its listener. Returns how many were removed.
    pub fn unregister_where<F>(&mut self, node: NodeId, mut pred: F) -> usize
    where
        F: FnMut(&Registration) -> bool,
    {
        let Some(state) = self.state.get(node) else { return 0 };
        let doomed: Vec<ListenerId> = state.registrations.iter()
            .rev()
            .filter(|r| pred(r))
            .map(|r| r.listener)
            .collect();
        for &id in &doomed {
            self.listeners.remove(node, id);
            self.state.forget_listener(node, id);
        }
        if !doomed.is_empty() {
            tracing::debug!("unregistered {} listener(s) from {}", doomed.len(), node);
        }
        doomed.len()
    }

    /// Scoped registrations of a node
    pub fn registrations(&self, node: NodeId) -> &[Registration] {
        self.state.get(node).map_or(&[], |s| s.registrations.as_slice())
    }

    /// Auxiliary state of a node, if any
    pub fn node_state(&self, node: NodeId) -> Option<&NodeState> {
        self.state.get(node)
    }

    /// Display value saved by the last hide
    pub fn prev_display(&self, node: NodeId) -> Option<&str> {
        self.state.get(node).and_then(|s| s.prev_display.as_deref())
    }

    pub fn set_prev_display(&mut self, node: NodeId, value: Option<String>) {
        self.state.entry(node).prev_display = value;
        self.state.prune(node);
    }

    /// Expando property
    pub fn expando(&self, node: NodeId, name: &str) -> Option<&serde_json::Value> {
        self.state.get(node).and_then(|s| s.expando.get(name))
    }

    pub fn set_expando(&mut self, node: NodeId, name: &str, value: serde_json::Value) {
        self.state.entry(node).expando.insert(name.to_string(), value);
    }

    pub fn remove_expando(&mut self, node: NodeId, name: &str) -> Option<serde_json::Value> {
        let old = self.state.entry(node).expando.remove(name);
        self.state.prune(node);
        old
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.tree.len())
            .field("ready_state", &self.ready_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new("about:blank");
        let tree = doc.tree();

        assert_eq!(tree.tag_name(doc.document_element()), Some("html"));
        assert_eq!(tree.parent(doc.body()), Some(doc.document_element()));
        assert!(doc.is_connected(doc.body()));
        assert!(!doc.is_connected(doc.window()));
    }

    #[test]
    fn test_event_path_reaches_window() {
        let mut doc = Document::new("about:blank");
        let div = doc.tree.create_element("div");
        doc.insert(InsertPosition::Append, doc.body(), div).unwrap();

        let path = doc.event_path(div, false);
        assert_eq!(path.first(), Some(&div));
        assert_eq!(path.last(), Some(&doc.window()));

        let detached = doc.tree.create_element("p");
        assert_eq!(doc.event_path(detached, false), vec![detached]);
    }

    #[test]
    fn test_scripts_run_once_when_connected() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::new("about:blank");
        let log = ran.clone();
        doc.set_script_runner(move |_, src| log.borrow_mut().push(src.to_string()));

        let script = doc.tree.create_element("script");
        doc.tree.set_text_content(script, "go()");
        doc.insert(InsertPosition::Append, doc.body(), script).unwrap();
        doc.insert(InsertPosition::Prepend, doc.body(), script).unwrap();

        assert_eq!(*ran.borrow(), vec!["go()".to_string()]);
    }

    #[test]
    fn test_inert_script_converted() {
        let ran = Rc::new(RefCell::new(0));
        let mut doc = Document::new("about:blank");
        let count = ran.clone();
        doc.set_script_runner(move |_, _| *count.borrow_mut() += 1);

        let div = doc.tree.create_element("div");
        let script = doc.tree.create_element("script");
        doc.tree.element_mut(script).unwrap().script.inert = true;
        doc.tree.element_mut(script).unwrap().set_attr("type", "module");
        doc.tree.append_child(div, script).unwrap();
        doc.insert(InsertPosition::Append, doc.body(), div).unwrap();
        assert_eq!(*ran.borrow(), 0);

        doc.convert_scripts(div).unwrap();
        assert_eq!(*ran.borrow(), 1);

        let live = doc.tree.element_children(div).next().unwrap();
        assert_ne!(live, script);
        assert_eq!(doc.tree.element(live).unwrap().get_attr("type"), Some("module"));
    }

    #[test]
    fn test_register_and_unregister() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let cb = EventCallback::new(|_| {});
        doc.register(body, "click", Some("ns".into()), cb.clone(), cb.clone(), ListenerOptions::default());
        doc.register(body, "keyup", None, cb.clone(), cb, ListenerOptions::default());

        assert_eq!(doc.registrations(body).len(), 2);
        assert_eq!(doc.listeners().count(body), 2);

        let removed = doc.unregister_where(body, |r| r.scope.as_deref() == Some("ns"));
        assert_eq!(removed, 1);
        assert_eq!(doc.registrations(body).len(), 1);
        assert_eq!(doc.listeners().count(body), 1);
    }
}
