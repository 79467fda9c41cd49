//! Inline Style Declarations
//!
//! `element.style` backed by the `style` attribute. Declarations keep their
//! source order; setting an existing property updates it in place.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};
use fos_dom::ElementData;

use crate::Declaration;

/// CSSStyleDeclaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclaration {
    declarations: Vec<Declaration>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration block body (`color: red; display: none !important`).
    /// Malformed declarations are dropped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for decl in parse_declarations(text) {
            style.put(decl);
        }
        style
    }

    /// Inline style of an element
    pub fn of(elem: &ElementData) -> Self {
        elem.get_attr("style").map(Self::parse).unwrap_or_default()
    }

    /// Write back to the `style` attribute; an element without one keeps it
    /// absent while the declaration list is empty
    pub fn write_to(&self, elem: &mut ElementData) {
        if self.declarations.is_empty() && !elem.has_attr("style") {
            return;
        }
        elem.set_attr("style", self.css_text());
    }

    /// Value of a property, empty when unset
    pub fn get_property_value(&self, name: &str) -> String {
        self.find(name).map(|d| d.value.clone()).unwrap_or_default()
    }

    /// `"important"` or empty
    pub fn get_property_priority(&self, name: &str) -> &'static str {
        match self.find(name) {
            Some(d) if d.important => "important",
            _ => "",
        }
    }

    /// setProperty: an empty value removes the property
    pub fn set_property(&mut self, name: &str, value: &str, priority: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.remove_property(name);
            return;
        }
        self.put(Declaration {
            property: normalize_name(name),
            value: value.to_string(),
            important: priority.eq_ignore_ascii_case("important"),
        });
    }

    /// removeProperty: returns the old value (empty when unset)
    pub fn remove_property(&mut self, name: &str) -> String {
        let name = normalize_name(name);
        match self.declarations.iter().position(|d| d.property == name) {
            Some(i) => self.declarations.remove(i).value,
            None => String::new(),
        }
    }

    /// Serialized form: `name: value[ !important];` joined by a space
    pub fn css_text(&self) -> String {
        self.declarations.iter()
            .map(|d| {
                let important = if d.important { " !important" } else { "" };
                format!("{}: {}{};", d.property, d.value, important)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Declarations in order
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn find(&self, name: &str) -> Option<&Declaration> {
        let name = normalize_name(name);
        self.declarations.iter().find(|d| d.property == name)
    }

    fn put(&mut self, decl: Declaration) {
        match self.declarations.iter_mut().find(|d| d.property == decl.property) {
            Some(existing) => *existing = decl,
            None => self.declarations.push(decl),
        }
    }
}

impl std::fmt::Display for StyleDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.css_text())
    }
}

/// Property names are ASCII case-insensitive, custom properties excepted
fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Parse the body of a declaration block
pub(crate) fn parse_declarations(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut decl_parser = InlineDeclarationParser;

    RuleBodyParser::new(&mut parser, &mut decl_parser)
        .flatten()
        .collect()
}

struct InlineDeclarationParser;

impl<'i> DeclarationParser<'i> for InlineDeclarationParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let raw = input.slice_from(start).trim();

        let (value, important) = split_important(raw);
        if value.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(Declaration {
            property: normalize_name(name.as_ref()),
            value: value.to_string(),
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for InlineDeclarationParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Strip a trailing `!important` (any case, optional space after `!`)
pub(crate) fn split_important(raw: &str) -> (&str, bool) {
    if let Some(bang) = raw.rfind('!') {
        if raw[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return (raw[..bang].trim_end(), true);
        }
    }
    (raw, false)
}
