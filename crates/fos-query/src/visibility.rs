//! show / hide / toggle
//!
//! A node is hidden when its inline or computed `display` is `none`. Hiding
//! remembers the inline value so the next show puts it back unchanged.

use fos_css::properties::visible_display;

use crate::classes::split_priority;
use crate::Collection;

impl Collection {
    pub fn show(&self) -> &Self {
        self.toggle(Some(true))
    }

    pub fn hide(&self) -> &Self {
        self.toggle(Some(false))
    }

    /// Flip visibility of every element; `Some(true)` only shows and
    /// `Some(false)` only hides
    pub fn toggle(&self, force: Option<bool>) -> &Self {
        for &node in self.iter() {
            let Some(tag) = self.dom.document().tree().tag_name(node).map(str::to_string) else {
                continue;
            };
            let Some(style) = self.inline_style(node) else { continue };
            let prev = style.get_property_value("display");
            let important = style.get_property_priority("display") == "important";
            let display = self.dom.computed_display(node);
            let hidden = prev == "none" || display == "none";

            if hidden && force != Some(false) {
                let saved = self.dom.document().prev_display(node).map(split_priority);
                let (value, priority) = saved.unwrap_or_else(|| {
                    if prev == display && display != "none" {
                        (String::new(), "")
                    } else {
                        (visible_display(&tag).to_string(), "")
                    }
                });
                self.edit_style(node, |s| s.set_property("display", &value, priority));
                // a stylesheet may still hide it
                if self.dom.computed_display(node) == "none" {
                    self.edit_style(node, |s| s.set_property("display", visible_display(&tag), ""));
                }
                self.dom.document_mut().set_prev_display(node, None);
                tracing::trace!("show {} ({:?})", node, value);
            }
            if !hidden && force != Some(true) {
                let saved = if important { format!("{} !important", prev) } else { prev };
                self.dom.document_mut().set_prev_display(node, Some(saved));
                self.edit_style(node, |s| s.set_property("display", "none", ""));
                tracing::trace!("hide {}", node);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::Dom;

    fn setup(html: &str) -> Dom {
        let dom = Dom::new();
        dom.query(dom.body()).unwrap().append(html).unwrap();
        dom
    }

    #[test]
    fn test_show_hide_show_restores_inline_display() {
        let dom = setup(r#"<div style="display: inline-flex; color: red;"></div>"#);
        let div = dom.query("div").unwrap();

        div.show().hide();
        assert_eq!(div.css("display").as_deref(), Some("none"));
        div.show();
        assert_eq!(div.css("display").as_deref(), Some("inline-flex"));
        assert_eq!(dom.document().prev_display(div[0]), None);
    }

    #[test]
    fn test_show_hide_show_keeps_priority() {
        let dom = setup(r#"<div style="display: flex !important"></div>"#);
        let div = dom.query("div").unwrap();

        div.hide();
        assert_eq!(div.css("display").as_deref(), Some("none"));
        div.show();
        assert_eq!(div.css("display").as_deref(), Some("flex!important"));
        assert_eq!(div.attr("style").as_deref(), Some("display: flex !important;"));
    }

    #[test]
    fn test_hide_without_inline_value() {
        let dom = setup("<p>x</p>");
        let p = dom.query("p").unwrap();

        p.hide();
        assert_eq!(dom.document().prev_display(p[0]), Some(""));
        p.show();
        assert_eq!(p.css("display").as_deref(), Some(""));
        assert_eq!(dom.computed_display(p[0]), "block");
    }

    #[test]
    fn test_show_element_hidden_by_stylesheet() {
        let dom = setup("<style>.off { display: none }</style><div class=\"off\"></div>");
        let div = dom.query(".off").unwrap();

        div.toggle(None);
        assert_eq!(div.css("display").as_deref(), Some("block"));
        div.toggle(None);
        assert_eq!(div.css("display").as_deref(), Some("none"));
        div.toggle(None);
        assert_eq!(div.css("display").as_deref(), Some("block"));
    }

    #[test]
    fn test_table_defaults() {
        let dom = setup(
            r#"<table><tr style="display:none"><td style="display:none">a</td></tr></table>"#,
        );
        dom.query("tr, td").unwrap().show();

        assert_eq!(dom.query("tr").unwrap().css("display").as_deref(), Some("table-row"));
        assert_eq!(dom.query("td").unwrap().css("display").as_deref(), Some("table-cell"));
    }

    #[test]
    fn test_forced_states_are_idempotent() {
        let dom = setup(r#"<span style="display: inline">s</span>"#);
        let span = dom.query("span").unwrap();

        span.hide().hide();
        assert_eq!(dom.document().prev_display(span[0]), Some("inline"));
        span.show().show();
        assert_eq!(span.css("display").as_deref(), Some("inline"));
    }

    #[test]
    fn test_non_elements_are_skipped() {
        let dom = setup("<p>text</p>");
        let text = dom.document().tree().children(dom.query("p").unwrap()[0]).next().unwrap();
        dom.query(text).unwrap().hide();
        assert!(dom.document().node_state(text).is_none());
    }
}
