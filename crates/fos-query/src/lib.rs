//! fOS Query - chainable DOM collections
//!
//! A [`Collection`] is an ordered list of nodes of one document with
//! chainable operations for querying, mutating and listening to the tree.
//! Collections are created from a [`Dom`], which shares the document with
//! every collection built from it.
//!
//! ```no_run
//! use fos_query::{Dom, EventCallback};
//!
//! let dom = Dom::parse("<ul><li>one</li><li>two</li></ul>")?;
//! let items = dom.query("li")?;
//! items.add_class("item").on("click.menu", EventCallback::new(|e| {
//!     println!("clicked {:?}", e.target);
//! }));
//! items.eq(0).click();
//! items.off("click.menu", None);
//! # Ok::<(), fos_query::QueryError>(())
//! ```
//!
//! Traversals (`find`, `filter`, `parent`, ...) return new collections that
//! remember the one they came from. Mutations return the receiver, except
//! [`Collection::replace`], which returns the inserted nodes.

mod config;
mod error;
mod dom;
mod collection;
mod traversal;
mod insert;
mod visibility;
mod events;
mod attributes;
mod classes;

pub use config::Config;
pub use error::{QueryError, QueryResult};
pub use dom::Dom;
pub use collection::{Collection, Selector};
pub use traversal::Filter;
pub use insert::Content;
pub use events::OnOptions;
pub use attributes::fix_prop;

pub use fos_dom::{
    Event, EventCallback, EventInit, EventKind, EventPhase, KeyboardData, ListenerOptions,
    MouseData, NodeId, ReadyState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
