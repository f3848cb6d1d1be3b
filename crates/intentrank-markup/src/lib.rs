//! intentrank-markup
//!
//! Markup corpus adapter: parses an HTML document into ranking candidates
//! and resolves locator hints against it, either as flat CSS selectors or as
//! path queries (see `xpath`).
pub mod document;
pub mod selector;
pub mod xpath;

pub use document::{read_markup, MarkupDocument};
pub use xpath::PathQuery;
