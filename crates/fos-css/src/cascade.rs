//! Style Cascade & Resolver
//!
//! Computes a property value for a DOM element by:
//! 1. Matching rules from the added stylesheets and from the `<style>`
//!    elements of the element's tree scope
//! 2. Sorting by importance, inline-ness, specificity and source order
//! 3. Falling back to the user-agent default

use fos_dom::{DomTree, NodeId};

use crate::properties::default_display;
use crate::{CssParser, Specificity, StyleDeclaration, Stylesheet};

/// Style resolver - computes styles for DOM elements
#[derive(Debug, Default)]
pub struct StyleResolver {
    /// Author stylesheets not present in the tree
    author_styles: Vec<Stylesheet>,
}

/// A candidate declaration: (important, inline, specificity, source order)
type Candidate = (bool, bool, Specificity, usize, String);

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an author stylesheet; applies before the tree's own `<style>` sheets
    pub fn add_stylesheet(&mut self, stylesheet: Stylesheet) {
        self.author_styles.push(stylesheet);
    }

    /// Cascaded value of `property`, `None` when nothing sets it
    pub fn compute_property(&self, tree: &DomTree, node: NodeId, property: &str) -> Option<String> {
        let elem = tree.element(node)?;
        let property = property.to_ascii_lowercase();
        let mut matches: Vec<Candidate> = Vec::new();
        let mut order = 0;

        let tree_sheets = self.tree_stylesheets(tree, node);
        for sheet in self.author_styles.iter().chain(tree_sheets.iter()) {
            for rule in &sheet.rules {
                let Some(spec) = rule.selectors.matching_specificity(tree, node) else {
                    order += rule.declarations.len();
                    continue;
                };
                for decl in &rule.declarations {
                    order += 1;
                    if decl.property == property {
                        matches.push((decl.important, false, spec, order, decl.value.clone()));
                    }
                }
            }
        }

        let inline = StyleDeclaration::of(elem);
        if let Some(decl) = inline.iter().find(|d| d.property == property) {
            matches.push((decl.important, true, Specificity::default(), usize::MAX, decl.value.clone()));
        }

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
                .then(a.3.cmp(&b.3))
        });
        matches.pop().map(|m| m.4)
    }

    /// getComputedStyle(node).display; empty for non-elements
    pub fn computed_display(&self, tree: &DomTree, node: NodeId) -> String {
        let Some(elem) = tree.element(node) else {
            return String::new();
        };
        if let Some(display) = self.compute_property(tree, node, "display") {
            return display;
        }
        if elem.has_attr("hidden") {
            return "none".to_string();
        }
        default_display(&elem.tag_name).to_string()
    }

    /// Sheets from `<style>` elements sharing the node's tree scope
    fn tree_stylesheets(&self, tree: &DomTree, node: NodeId) -> Vec<Stylesheet> {
        let scope = tree.root_of(node);
        tree.descendants(scope)
            .into_iter()
            .filter(|&n| tree.element(n).is_some_and(|e| e.is("style")))
            .filter_map(|n| CssParser::new().parse(&tree.text_content(n)).ok())
            .collect()
    }
}
