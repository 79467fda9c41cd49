//! Class list and inline style helpers

use fos_css::StyleDeclaration;
use fos_dom::{DOMTokenList, NodeId};

use crate::Collection;

/// Split a list on commas and whitespace, dropping empty items
pub(crate) fn split_list(list: &str) -> Vec<&str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip the first `!important` (any case) from a value
pub(crate) fn split_priority(value: &str) -> (String, &'static str) {
    const MARKER: &str = "!important";
    match value.to_ascii_lowercase().find(MARKER) {
        Some(i) => (format!("{}{}", &value[..i], &value[i + MARKER.len()..]), "important"),
        None => (value.to_string(), ""),
    }
}

impl Collection {
    pub fn add_class(&self, classes: &str) -> &Self {
        self.toggle_class(Some(classes), Some(true))
    }

    /// Remove the given classes, or every class when `None`
    pub fn remove_class(&self, classes: Option<&str>) -> &Self {
        self.toggle_class(classes, Some(false))
    }

    /// Toggle each class; `force` adds (`true`) or removes (`false`) instead
    pub fn toggle_class(&self, classes: Option<&str>, force: Option<bool>) -> &Self {
        let names = classes.map(split_list);
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            let Some(elem) = doc.tree_mut().element_mut(node) else { continue };
            let mut list = DOMTokenList::of(elem);
            let names: Vec<String> = match (&names, force) {
                (Some(names), _) => names.iter().map(|s| s.to_string()).collect(),
                (None, Some(false)) => list.iter().map(String::from).collect(),
                (None, _) => continue,
            };
            for name in &names {
                list.toggle(name, force);
            }
            list.write_to(elem);
        }
        self
    }

    /// Whether any node carries every one of `classes`
    pub fn has_class(&self, classes: &str) -> bool {
        let names = split_list(classes);
        if names.is_empty() {
            return false;
        }
        let doc = self.dom.document();
        self.iter().any(|&node| {
            doc.tree()
                .element(node)
                .is_some_and(|e| names.iter().all(|name| e.has_class(name)))
        })
    }

    /// Classes of the first node
    pub fn class_list(&self) -> Option<Vec<String>> {
        let doc = self.dom.document();
        let elem = doc.tree().element(self.first()?)?;
        Some(DOMTokenList::of(elem).iter().map(String::from).collect())
    }

    /// Inline value of `key` on the first node, with `!important` appended
    /// when it carries that priority
    pub fn css(&self, key: &str) -> Option<String> {
        let style = self.inline_style(self.first()?)?;
        let priority = style.get_property_priority(key);
        let mut value = style.get_property_value(key);
        if !priority.is_empty() {
            value.push('!');
            value.push_str(priority);
        }
        Some(value)
    }

    /// Every inline declaration of the first node
    pub fn css_map(&self) -> Option<Vec<(String, String)>> {
        let style = self.inline_style(self.first()?)?;
        Some(
            style.iter()
                .map(|d| {
                    let value = if d.important { format!("{} !important", d.value) } else { d.value.clone() };
                    (d.property.clone(), value)
                })
                .collect(),
        )
    }

    /// Set an inline property on every node; a value containing
    /// `!important` is stored with that priority
    pub fn set_css(&self, key: &str, value: &str) -> &Self {
        self.set_css_map([(key, value)])
    }

    pub fn set_css_map<I, K, V>(&self, map: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries: Vec<(String, String, &'static str)> = map.into_iter()
            .map(|(k, v)| {
                let (value, priority) = split_priority(v.as_ref());
                (k.as_ref().to_string(), value, priority)
            })
            .collect();
        for &node in self.iter() {
            self.edit_style(node, |style| {
                for (key, value, priority) in &entries {
                    style.set_property(key, value, priority);
                }
            });
        }
        self
    }

    pub(crate) fn inline_style(&self, node: NodeId) -> Option<StyleDeclaration> {
        let doc = self.dom.document();
        doc.tree().element(node).map(StyleDeclaration::of)
    }

    /// Read-modify-write the `style` attribute of an element
    pub(crate) fn edit_style<F>(&self, node: NodeId, f: F)
    where
        F: FnOnce(&mut StyleDeclaration),
    {
        let mut doc = self.dom.document_mut();
        let Some(elem) = doc.tree_mut().element_mut(node) else { return };
        let mut style = StyleDeclaration::of(elem);
        f(&mut style);
        style.write_to(elem);
    }
}
