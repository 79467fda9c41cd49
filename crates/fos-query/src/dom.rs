//! Dom - shared document handle
//!
//! Every [`Collection`] keeps a clone of the handle it was created from.
//! The document sits behind `Rc<RefCell<..>>` so event callbacks can reach
//! it while a dispatch is running; borrows are never held across callbacks.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use fos_css::{SelectorCache, SelectorList, StyleResolver};
use fos_dom::{dispatch_event, Document, Event, EventCallback, EventInit, ListenerOptions, NodeId, ReadyState};
use fos_html::HtmlParser;

use crate::collection::{Collection, Selector};
use crate::{Config, QueryError, QueryResult};

struct Shared {
    document: Rc<RefCell<Document>>,
    selectors: RefCell<SelectorCache>,
    styles: StyleResolver,
    parser: HtmlParser,
    config: Config,
}

/// Handle to a document and the services collections need
#[derive(Clone)]
pub struct Dom {
    shared: Rc<Shared>,
}

impl Dom {
    /// Empty `<html><head></head><body></body></html>` document
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let document = Document::new(&config.url);
        Self::from_document(document, config)
    }

    /// Parse a whole HTML document
    pub fn parse(html: &str) -> QueryResult<Self> {
        Self::parse_with_config(html, Config::default())
    }

    pub fn parse_with_config(html: &str, config: Config) -> QueryResult<Self> {
        let document = HtmlParser::new().parse_with_url(html, &config.url)?;
        Ok(Self::from_document(document, config))
    }

    /// Wrap an existing document
    pub fn from_document(mut document: Document, config: Config) -> Self {
        document.set_scripting_enabled(config.enable_scripts);
        tracing::debug!("new Dom for {} ({} nodes)", document.url(), document.tree().len());
        Self {
            shared: Rc::new(Shared {
                document: Rc::new(RefCell::new(document)),
                selectors: RefCell::new(SelectorCache::new(config.selector_cache_size)),
                styles: StyleResolver::new(),
                parser: HtmlParser::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Borrow the document
    pub fn document(&self) -> Ref<'_, Document> {
        self.shared.document.borrow()
    }

    /// Borrow the document mutably
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.shared.document.borrow_mut()
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.document().root()
    }

    pub fn window(&self) -> NodeId {
        self.document().window()
    }

    pub fn body(&self) -> NodeId {
        self.document().body()
    }

    /// Install the callback executing connected `<script>` elements
    pub fn set_script_runner<F>(&self, runner: F)
    where
        F: FnMut(NodeId, &str) + 'static,
    {
        self.document_mut().set_script_runner(runner);
    }

    /// Resolve a selector against the document
    pub fn query<'a>(&self, selector: impl Into<Selector<'a>>) -> QueryResult<Collection> {
        Collection::build(self, selector.into(), None)
    }

    /// Resolve a selector against `context`
    pub fn query_in<'a>(&self, selector: impl Into<Selector<'a>>, context: NodeId) -> QueryResult<Collection> {
        Collection::build(self, selector.into(), Some(context))
    }

    /// Parse `html` into a detached fragment; the collection holds its
    /// element children and uses the fragment as context
    pub fn fragment(&self, html: &str) -> QueryResult<Collection> {
        let fragment = self.parse_fragment(html)?;
        let children: Vec<NodeId> = self.document().tree().element_children(fragment).collect();
        Collection::build(self, Selector::Nodes(children), Some(fragment))
    }

    /// Run `callback` once the document has loaded (immediately if it has)
    pub fn ready<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        if self.document().ready_state() == ReadyState::Complete {
            callback();
            return;
        }
        let window = self.window();
        let listener = EventCallback::new(move |_| callback());
        self.document_mut().add_event_listener(window, "load", listener, ListenerOptions::default());
    }

    /// Mark loading finished: `DOMContentLoaded` on the document, then
    /// `load` on the window
    pub fn finish_loading(&self) {
        if self.document().ready_state() == ReadyState::Complete {
            return;
        }
        let (root, window) = {
            let mut doc = self.document_mut();
            doc.set_ready_state(ReadyState::Interactive);
            (doc.root(), doc.window())
        };
        let mut loaded = Event::new("DOMContentLoaded", EventInit::bubbling());
        dispatch_event(&self.shared.document, root, &mut loaded);

        self.document_mut().set_ready_state(ReadyState::Complete);
        let mut load = Event::new("load", EventInit::default());
        dispatch_event(&self.shared.document, window, &mut load);
        tracing::debug!("document {} loaded", self.document().url());
    }

    // ------------------------------------------------------------------
    // Services for collections
    // ------------------------------------------------------------------

    pub(crate) fn cell(&self) -> &Rc<RefCell<Document>> {
        &self.shared.document
    }

    pub(crate) fn same(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Parsed selector list (cached)
    pub(crate) fn selector(&self, text: &str) -> QueryResult<Rc<SelectorList>> {
        self.shared.selectors
            .borrow_mut()
            .get_or_parse(text)
            .map_err(|_| QueryError::InvalidSelector(text.to_string()))
    }

    /// Fragment with every `<script>` replaced by a live copy
    pub(crate) fn parse_fragment(&self, html: &str) -> QueryResult<NodeId> {
        let mut doc = self.document_mut();
        let fragment = self.shared.parser.parse_fragment(&mut doc, html)?;
        let children: Vec<NodeId> = doc.tree().children(fragment).collect();
        for child in children {
            doc.convert_scripts(child)?;
        }
        Ok(fragment)
    }

    /// getComputedStyle(node).display
    pub(crate) fn computed_display(&self, node: NodeId) -> String {
        self.shared.styles.computed_display(self.document().tree(), node)
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("document", &*self.document())
            .field("config", &self.shared.config)
            .finish()
    }
}
