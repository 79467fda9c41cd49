//! Query errors

use fos_dom::DomError;
use fos_html::HtmlError;

/// Query error
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Unrecognized collection input: bad selector text or a foreign node
    #[error("Invalid selector \"{0}\"")]
    InvalidSelector(String),

    /// Selector resolved against a node that cannot be queried
    #[error("Invalid context")]
    InvalidContext,

    #[error("Incorrect argument for \"{method}(html)\". It expects one string argument.")]
    InvalidInsertionArgument { method: &'static str },

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Html(#[from] HtmlError),
}

/// Result alias for query operations
pub type QueryResult<T> = Result<T, QueryError>;
