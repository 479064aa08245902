//! Source module
//!
//! Fetch strategies: how "I already have these items" becomes a request.
//!
//! # Overview
//!
//! The paginator only knows whether a page came back full, short or empty.
//! Everything about the pagination mechanism lives behind [`PageSource`]:
//! - `OffsetSource` - offset = number of loaded items
//! - `PageNumberSource` - page index derived from loaded items and limit
//! - `CursorSource` - cursor taken from the last loaded item
//! - `HttpSource` - offset pagination over a JSON HTTP endpoint

mod http;
mod strategies;
mod types;

pub use http::HttpSource;
pub use strategies::{CursorSource, OffsetSource, PageNumberSource};
pub use types::{PageFuture, PageSource};
