//! CSS Property Defaults
//!
//! User-agent defaults for the properties the query layer reads.

/// Elements rendered inline by default
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "textarea", "time", "u", "var", "wbr",
];

/// Elements never rendered
const HIDDEN_ELEMENTS: &[&str] = &[
    "area", "base", "datalist", "head", "link", "meta", "noscript", "param", "script",
    "source", "style", "template", "title", "track",
];

/// Default `display` for an element with the given lowercase tag name
pub fn default_display(tag: &str) -> &'static str {
    match tag {
        "table" => "table",
        "caption" => "table-caption",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "col" => "table-column",
        "colgroup" => "table-column-group",
        "li" => "list-item",
        "summary" => "list-item",
        _ if INLINE_ELEMENTS.contains(&tag) => "inline",
        _ if HIDDEN_ELEMENTS.contains(&tag) => "none",
        _ => "block",
    }
}

/// Display used when an element becomes visible without a saved value
pub fn visible_display(tag: &str) -> &'static str {
    match tag {
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        _ => "block",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display() {
        assert_eq!(default_display("div"), "block");
        assert_eq!(default_display("span"), "inline");
        assert_eq!(default_display("tr"), "table-row");
        assert_eq!(default_display("th"), "table-cell");
        assert_eq!(default_display("script"), "none");
        assert_eq!(default_display("my-widget"), "block");
    }

    #[test]
    fn test_visible_display() {
        assert_eq!(visible_display("td"), "table-cell");
        assert_eq!(visible_display("span"), "block");
    }
}
