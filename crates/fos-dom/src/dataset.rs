//! DOMStringMap (dataset)
//!
//! Maps camelCase dataset keys onto `data-*` attributes.

use crate::node::ElementData;

/// Dataset view of an element's `data-*` attributes
pub struct DOMStringMap;

impl DOMStringMap {
    /// All entries as (camelCase key, value), in attribute order
    pub fn entries(elem: &ElementData) -> Vec<(String, String)> {
        elem.attrs.iter()
            .filter_map(|a| {
                a.name.strip_prefix("data-")
                    .map(|key| (to_camel_case(key), a.value.clone()))
            })
            .collect()
    }

    /// Get value by camelCase key
    pub fn get<'a>(elem: &'a ElementData, key: &str) -> Option<&'a str> {
        elem.get_attr(&Self::to_attribute_name(key))
    }

    /// Set value by camelCase key
    pub fn set(elem: &mut ElementData, key: &str, value: &str) {
        elem.set_attr(&Self::to_attribute_name(key), value);
    }

    /// Delete by key
    pub fn delete(elem: &mut ElementData, key: &str) -> bool {
        elem.remove_attr(&Self::to_attribute_name(key)).is_some()
    }

    /// Convert key to attribute name
    pub fn to_attribute_name(key: &str) -> String {
        format!("data-{}", to_kebab_case(key))
    }
}

/// Convert kebab-case to camelCase
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert camelCase to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
