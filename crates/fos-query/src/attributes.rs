//! Attributes, properties, dataset and content accessors
//!
//! Properties are modelled on the element interface: a fixed set reflects
//! attributes or content, every other name is an expando value kept in the
//! document's side-table. Getters read the first node and return `None` for
//! an empty collection.

use fos_dom::{DOMStringMap, InsertPosition, NodeId};
use fos_html::{inner_html, outer_html};
use serde_json::{Map, Value};

use crate::classes::split_list;
use crate::{Collection, QueryResult};

/// HTML attribute spelling → property name
pub fn fix_prop(name: &str) -> &str {
    match name {
        "cellpadding" => "cellPadding",
        "cellspacing" => "cellSpacing",
        "class" => "className",
        "colspan" => "colSpan",
        "contenteditable" => "contentEditable",
        "for" => "htmlFor",
        "frameborder" => "frameBorder",
        "maxlength" => "maxLength",
        "readonly" => "readOnly",
        "rowspan" => "rowSpan",
        "tabindex" => "tabIndex",
        "usemap" => "useMap",
        _ => name,
    }
}

/// How a property maps onto the element
#[derive(Debug, Clone, Copy, PartialEq)]
enum Reflect {
    /// String attribute
    Attr(&'static str),
    /// Integer attribute with its default
    Number(&'static str, i64),
    /// Presence attribute
    Bool(&'static str),
    Text,
    InnerHtml,
    OuterHtml,
    Value,
    TagName,
}

fn reflection(prop: &str, tag: &str) -> Option<Reflect> {
    let focusable = matches!(tag, "a" | "button" | "input" | "select" | "textarea");
    Some(match prop {
        "id" => Reflect::Attr("id"),
        "className" => Reflect::Attr("class"),
        "title" => Reflect::Attr("title"),
        "htmlFor" => Reflect::Attr("for"),
        "contentEditable" => Reflect::Attr("contenteditable"),
        "frameBorder" => Reflect::Attr("frameborder"),
        "useMap" => Reflect::Attr("usemap"),
        "cellPadding" => Reflect::Attr("cellpadding"),
        "cellSpacing" => Reflect::Attr("cellspacing"),
        "tabIndex" => Reflect::Number("tabindex", if focusable { 0 } else { -1 }),
        "colSpan" => Reflect::Number("colspan", 1),
        "rowSpan" => Reflect::Number("rowspan", 1),
        "maxLength" => Reflect::Number("maxlength", -1),
        "checked" => Reflect::Bool("checked"),
        "disabled" => Reflect::Bool("disabled"),
        "readOnly" => Reflect::Bool("readonly"),
        "hidden" => Reflect::Bool("hidden"),
        "selected" => Reflect::Bool("selected"),
        "required" => Reflect::Bool("required"),
        "multiple" => Reflect::Bool("multiple"),
        "textContent" => Reflect::Text,
        "innerHTML" => Reflect::InnerHtml,
        "outerHTML" => Reflect::OuterHtml,
        "value" => Reflect::Value,
        "tagName" | "nodeName" => Reflect::TagName,
        _ => return None,
    })
}

/// String conversion of a dynamic value
fn to_js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter()
            .map(|v| if v.is_null() { String::new() } else { to_js_string(v) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Dataset values holding JSON arrays or objects are decoded
fn decode_data(raw: &str) -> Value {
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn check_data_key(key: &str) {
    if key.contains('-') {
        tracing::error!(
            "Key \"{}\" contains \"-\" (dash). Dashes are not allowed in property names. Use camelCase instead.",
            key
        );
    }
}

impl Collection {
    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attr(&self, name: &str) -> Option<String> {
        let doc = self.dom.document();
        doc.tree().element(self.first()?)?.get_attr(name).map(str::to_string)
    }

    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        self.set_attrs([(name, value)])
    }

    pub fn set_attrs<I, K, V>(&self, attrs: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            let Some(elem) = doc.tree_mut().element_mut(node) else { continue };
            for (name, value) in &attrs {
                elem.set_attr(name.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// Remove the comma or whitespace separated attribute `names`
    pub fn remove_attr(&self, names: &str) -> &Self {
        let names = split_list(names);
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            let Some(elem) = doc.tree_mut().element_mut(node) else { continue };
            for name in &names {
                elem.remove_attr(name);
            }
        }
        self
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Property of the first node (`None` when undefined)
    pub fn prop(&self, name: &str) -> Option<Value> {
        self.read_prop(self.first()?, fix_prop(name))
    }

    pub fn set_prop(&self, name: &str, value: impl Into<Value>) -> QueryResult<&Self> {
        let value = value.into();
        let name = fix_prop(name);
        for &node in self.iter() {
            self.write_prop(node, name, &value)?;
        }
        Ok(self)
    }

    pub fn set_props<I, K>(&self, props: I) -> QueryResult<&Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let props: Vec<(K, Value)> = props.into_iter().collect();
        for &node in self.iter() {
            for (name, value) in &props {
                self.write_prop(node, fix_prop(name.as_ref()), value)?;
            }
        }
        Ok(self)
    }

    /// Delete expando properties; reflected properties cannot be deleted
    pub fn remove_prop(&self, names: &str) -> &Self {
        let names = split_list(names);
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            for name in &names {
                doc.remove_expando(node, fix_prop(name));
            }
        }
        self
    }

    fn read_prop(&self, node: NodeId, name: &str) -> Option<Value> {
        let doc = self.dom.document();
        let tree = doc.tree();
        let Some(elem) = tree.element(node) else {
            return match name {
                "textContent" => Some(Value::String(tree.text_content(node))),
                _ => doc.expando(node, name).cloned(),
            };
        };
        let Some(reflect) = reflection(name, &elem.tag_name) else {
            return doc.expando(node, name).cloned();
        };

        let value = match reflect {
            Reflect::Attr(attr) => Value::String(elem.get_attr(attr).unwrap_or_default().to_string()),
            Reflect::Number(attr, default) => {
                let n = elem.get_attr(attr).and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(default);
                Value::from(n)
            }
            Reflect::Bool(attr) => Value::Bool(elem.has_attr(attr)),
            Reflect::Text => Value::String(tree.text_content(node)),
            Reflect::InnerHtml => Value::String(inner_html(tree, node)),
            Reflect::OuterHtml => Value::String(outer_html(tree, node)),
            Reflect::TagName => Value::String(elem.tag_name.to_ascii_uppercase()),
            Reflect::Value => Value::String(match elem.tag_name.as_str() {
                "textarea" => tree.text_content(node),
                "select" => {
                    let options: Vec<NodeId> = tree.descendants(node)
                        .into_iter()
                        .filter(|&n| tree.tag_name(n) == Some("option"))
                        .collect();
                    let chosen = options.iter()
                        .find(|&&o| tree.element(o).is_some_and(|e| e.has_attr("selected")))
                        .or(options.first());
                    chosen.map(|&o| option_value(tree, o)).unwrap_or_default()
                }
                "option" => option_value(tree, node),
                _ => elem.get_attr("value").unwrap_or_default().to_string(),
            }),
        };
        Some(value)
    }

    fn write_prop(&self, node: NodeId, name: &str, value: &Value) -> QueryResult<()> {
        let reflect = {
            let doc = self.dom.document();
            let tree = doc.tree();
            match tree.element(node) {
                Some(elem) => reflection(name, &elem.tag_name),
                None if name == "textContent" => Some(Reflect::Text),
                None => None,
            }
        };
        let text = if value.is_null() { String::new() } else { to_js_string(value) };

        let mut doc = self.dom.document_mut();
        let Some(reflect) = reflect else {
            doc.set_expando(node, name, value.clone());
            return Ok(());
        };
        match reflect {
            Reflect::InnerHtml => {
                drop(doc);
                self.write_inner_html(node, &text)?;
            }
            Reflect::Text => doc.tree_mut().set_text_content(node, &text),
            Reflect::Value if doc.tree().tag_name(node) == Some("textarea") => {
                doc.tree_mut().set_text_content(node, &text);
            }
            Reflect::Value if doc.tree().tag_name(node) == Some("select") => {
                let tree = doc.tree_mut();
                let options: Vec<NodeId> = tree.descendants(node)
                    .into_iter()
                    .filter(|&n| tree.tag_name(n) == Some("option"))
                    .collect();
                let values: Vec<String> = options.iter().map(|&o| option_value(tree, o)).collect();
                let target = values.iter().position(|v| *v == text);
                for (i, &option) in options.iter().enumerate() {
                    if let Some(elem) = tree.element_mut(option) {
                        if Some(i) == target {
                            elem.set_attr("selected", "");
                        } else {
                            elem.remove_attr("selected");
                        }
                    }
                }
            }
            Reflect::Value => {
                if let Some(elem) = doc.tree_mut().element_mut(node) {
                    elem.set_attr("value", text);
                }
            }
            Reflect::Attr(attr) | Reflect::Number(attr, _) => {
                if let Some(elem) = doc.tree_mut().element_mut(node) {
                    elem.set_attr(attr, text);
                }
            }
            Reflect::Bool(attr) => {
                if let Some(elem) = doc.tree_mut().element_mut(node) {
                    if is_truthy(value) {
                        elem.set_attr(attr, "");
                    } else {
                        elem.remove_attr(attr);
                    }
                }
            }
            Reflect::OuterHtml | Reflect::TagName => {
                tracing::debug!("ignoring write to read-only property {} on {}", name, node);
            }
        }
        Ok(())
    }

    /// Replace the children of an element or shadow root with parsed markup;
    /// scripts in it run once connected
    fn write_inner_html(&self, node: NodeId, html: &str) -> QueryResult<()> {
        let accepts = {
            let doc = self.dom.document();
            doc.tree().element(node).is_some() || doc.tree().is_shadow_root(node)
        };
        if !accepts {
            return Ok(());
        }
        let fragment = self.dom.parse_fragment(html)?;
        let mut doc = self.dom.document_mut();
        doc.tree_mut().remove_children(node);
        doc.insert(InsertPosition::Append, node, fragment)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Inner HTML of the first node
    pub fn html(&self) -> Option<String> {
        self.prop("innerHTML").map(|v| to_js_string(&v))
    }

    pub fn set_html(&self, html: &str) -> QueryResult<&Self> {
        self.set_prop("innerHTML", html)
    }

    /// Remove all children
    pub fn empty(&self) -> QueryResult<&Self> {
        self.set_html("")
    }

    /// Text content of the first node
    pub fn text(&self) -> Option<String> {
        self.prop("textContent").map(|v| to_js_string(&v))
    }

    pub fn set_text(&self, text: &str) -> &Self {
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            doc.tree_mut().set_text_content(node, text);
        }
        self
    }

    /// Form value of the first node
    pub fn val(&self) -> Option<String> {
        self.prop("value").map(|v| to_js_string(&v))
    }

    pub fn set_val(&self, value: &str) -> QueryResult<&Self> {
        self.set_prop("value", value)
    }

    // ------------------------------------------------------------------
    // Dataset
    // ------------------------------------------------------------------

    /// Dataset value of the first node
    pub fn data(&self, key: &str) -> Option<Value> {
        check_data_key(key);
        let doc = self.dom.document();
        let elem = doc.tree().element(self.first()?)?;
        DOMStringMap::get(elem, key).map(decode_data)
    }

    /// The whole dataset of the first node
    pub fn dataset(&self) -> Option<Map<String, Value>> {
        let doc = self.dom.document();
        let elem = doc.tree().element(self.first()?)?;
        Some(
            DOMStringMap::entries(elem)
                .into_iter()
                .map(|(key, raw)| (key, decode_data(&raw)))
                .collect(),
        )
    }

    /// Set a dataset value; `Value::Null` deletes it, arrays and objects are
    /// stored as JSON
    pub fn set_data(&self, key: &str, value: impl Into<Value>) -> &Self {
        self.set_data_map([(key, value.into())])
    }

    pub fn set_data_map<I, K>(&self, data: I) -> &Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let data: Vec<(K, Value)> = data.into_iter().collect();
        for (key, _) in &data {
            check_data_key(key.as_ref());
        }
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            let Some(elem) = doc.tree_mut().element_mut(node) else { continue };
            for (key, value) in &data {
                match value {
                    Value::Null => {
                        DOMStringMap::delete(elem, key.as_ref());
                    }
                    Value::String(s) => DOMStringMap::set(elem, key.as_ref(), s),
                    other => DOMStringMap::set(elem, key.as_ref(), &other.to_string()),
                }
            }
        }
        self
    }

    /// Delete the comma or whitespace separated dataset `keys`
    pub fn remove_data(&self, keys: &str) -> &Self {
        let keys = split_list(keys);
        let mut doc = self.dom.document_mut();
        for &node in self.iter() {
            let Some(elem) = doc.tree_mut().element_mut(node) else { continue };
            for key in &keys {
                DOMStringMap::delete(elem, key);
            }
        }
        self
    }
}

/// `option.value`: the value attribute, else the text
fn option_value(tree: &fos_dom::DomTree, option: NodeId) -> String {
    match tree.element(option).and_then(|e| e.get_attr("value")) {
        Some(v) => v.to_string(),
        None => tree.text_content(option).trim().to_string(),
    }
}
