//! fOS CSS - Selectors & Style
//!
//! Selector matching (`querySelectorAll`, `matches`, `closest`), inline
//! `style` declarations and the small cascade needed to compute `display`.

mod parser;
mod cascade;
mod style;
mod query_cache;
pub mod properties;
pub mod selectors;

pub use parser::CssParser;
pub use cascade::StyleResolver;
pub use style::StyleDeclaration;
pub use query_cache::SelectorCache;
pub use selectors::{closest, query_all, query_first, SelectorList};

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Parsed stylesheet
#[derive(Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of style rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// CSS style rule
#[derive(Debug)]
pub struct Rule {
    /// Prelude as written
    pub selector_text: String,
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
}

/// Selector specificity (a, b, c)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lowercase property name (custom properties keep their case)
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// CSS error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CssError {
    #[error("'{selector}' is not a valid selector: {message}")]
    Selector { selector: String, message: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u32, message: String },
}
