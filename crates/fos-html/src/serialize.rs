//! HTML Serialization
//!
//! innerHTML / outerHTML for nodes of a [`DomTree`].

use fos_dom::{DomTree, NodeData, NodeId};

/// Elements without end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are written unescaped
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Serialize the children of `node`
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Serialize `node` itself; documents and fragments serialize their children
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &DomTree, node: NodeId, out: &mut String) {
    let Some(n) = tree.get(node) else { return };
    match &n.data {
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag_name);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag_name.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag_name.as_str());
            for child in tree.children(node) {
                match tree.get(child).and_then(|c| c.as_text()) {
                    Some(text) if raw => out.push_str(text),
                    _ => write_node(tree, child, out),
                }
            }
            out.push_str("</");
            out.push_str(&elem.tag_name);
            out.push('>');
        }
        NodeData::Text(text) => escape(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Document | NodeData::Fragment | NodeData::ShadowRoot { .. } => {
            for child in tree.children(node) {
                write_node(tree, child, out);
            }
        }
        NodeData::Window => {}
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Attribute;

    #[test]
    fn test_outer_html() {
        let mut tree = DomTree::new();
        let div = tree.create_element_with_attrs("div", vec![Attribute::new("title", "a \"b\" & c")]);
        let br = tree.create_element("br");
        let text = tree.create_text("1 < 2");
        tree.append_child(div, br).unwrap();
        tree.append_child(div, text).unwrap();

        assert_eq!(
            outer_html(&tree, div),
            "<div title=\"a &quot;b&quot; &amp; c\"><br>1 &lt; 2</div>"
        );
        assert_eq!(inner_html(&tree, div), "<br>1 &lt; 2");
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let mut tree = DomTree::new();
        let script = tree.create_element("script");
        tree.set_text_content(script, "if (a < b && c) {}");

        assert_eq!(outer_html(&tree, script), "<script>if (a < b && c) {}</script>");
    }

    #[test]
    fn test_comment() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let c = tree.create_comment(" note ");
        tree.append_child(p, c).unwrap();

        assert_eq!(inner_html(&tree, p), "<!-- note -->");
    }
}
