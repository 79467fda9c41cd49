//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever: whole documents, and fragments owned by
//! an existing document. Also serializes nodes back to markup.

mod parser;
mod serialize;

pub use fos_dom::Document;
pub use parser::HtmlParser;
pub use serialize::{inner_html, outer_html};

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML parsing error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("I/O error while reading HTML: {0}")]
    Io(#[from] std::io::Error),
}
