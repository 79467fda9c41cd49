//! HTML5 Parser implementation
//!
//! Uses html5ever's build-in RcDom and converts to our DOM format.
//! Fragments are parsed with a `<template>` context element, which accepts
//! any markup (including table parts) without implied html/head/body wrappers.

use fos_dom::{Document, DomTree, ElementData, Node, NodeData, NodeId, Attribute};
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, ns, parse_document, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// How converted `<script>` elements are flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptMode {
    /// Document parsing: scripts count as already handled
    Started,
    /// Fragment parsing: scripts never execute
    Inert,
}

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_rcdom(html)?;

        let mut document = Document::empty(url);
        let root = document.root();
        for child in dom.document.children.borrow().iter() {
            convert_node(child, document.tree_mut(), root, ScriptMode::Started);
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse `html` into a detached fragment owned by `doc`. Scripts inside
    /// it are inert.
    pub fn parse_fragment(&self, doc: &mut Document, html: &str) -> Result<NodeId, HtmlError> {
        let context = QualName::new(None, ns!(html), local_name!("template"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new(), false)
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let tree = doc.tree_mut();
        let fragment = tree.create_fragment();
        // parsed nodes live under the synthetic <html> root
        let root = dom.document.children.borrow().first().cloned();
        if let Some(root) = root {
            for child in root.children.borrow().iter() {
                convert_node(child, tree, fragment, ScriptMode::Inert);
            }
        }

        tracing::trace!("Parsed fragment {} with {} top-level nodes", fragment, tree.children(fragment).count());
        Ok(fragment)
    }
}

fn parse_rcdom(html: &str) -> Result<RcDom, HtmlError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    Ok(dom)
}

/// Convert an RcDom node to our DOM format, appending it to `parent`
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId, scripts: ScriptMode) {
    let id = match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent, scripts);
            }
            return;
        }
        RcNodeData::Doctype { name, public_id, system_id } => tree.alloc(Node::new(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        })),
        RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
        RcNodeData::Comment { contents } => tree.create_comment(contents),
        RcNodeData::Element { name, attrs, template_contents, .. } => {
            let mut elem = ElementData::new(&name.local);
            elem.attrs = attrs.borrow()
                .iter()
                .map(|a| Attribute::new(a.name.local.to_string(), a.value.to_string()))
                .collect();
            if elem.is("script") {
                match scripts {
                    ScriptMode::Inert => elem.script.inert = true,
                    ScriptMode::Started => elem.script.already_started = true,
                }
            }
            let id = tree.alloc(Node::new(NodeData::Element(elem)));

            // template contents become ordinary children
            let contents = template_contents.borrow().clone();
            let children = match contents {
                Some(c) => c.children.borrow().clone(),
                None => handle.children.borrow().clone(),
            };
            for child in children.iter() {
                convert_node(child, tree, id, scripts);
            }
            id
        }
        RcNodeData::ProcessingInstruction { .. } => return,
    };

    // converted nodes are fresh and parents are elements, fragments or the document
    if let Err(e) = tree.append_child(parent, id) {
        tracing::warn!("dropping parsed node {}: {}", id, e);
    }
}
