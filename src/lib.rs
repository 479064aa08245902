//! # pagewise
//!
//! A paged-data controller: loads a remote collection one page at a time,
//! keeps the loaded items, and tells a view what to show at every step.
//!
//! ## Features
//!
//! - **Explicit State Machine**: Pure transition table over nine states
//! - **Stale-Result Safety**: Every fetch is tagged; superseded pages are dropped
//! - **Pluggable Fetching**: Offset, page number, cursor or HTTP strategies
//! - **Headless Views**: Coarse show/hide signals, no UI toolkit assumed
//! - **Local Edits**: Insert, remove and replace items between fetches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewise::{OffsetSource, Paginator, TracingView, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = OffsetSource::new(|offset, limit| async move {
//!         Ok((offset..offset + limit).collect::<Vec<usize>>())
//!     });
//!
//!     let paginator = Paginator::new(source, TracingView::new("numbers"), 20)?;
//!     paginator.start();
//!     paginator.settled().await;
//!
//!     paginator.load_more();
//!     let snapshot = paginator.settled().await;
//!     println!("{} items, {}", snapshot.len, snapshot.state);
//!
//!     paginator.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Paginator (handle)                         │
//! │  start  refresh  load_more  stop  insert  remove  replace  get   │
//! └──────────────────────────────┬───────────────────────────────────┘
//!                                │ one lock
//! ┌──────────────────────────────┴───────────────────────────────────┐
//! │                           Machine                                │
//! │  transition(state, event) → item op, next state, effects         │
//! └──────────┬──────────────────────────────────────┬────────────────┘
//!            │ Fetch / Cancel commands               │ entry signals
//! ┌──────────┴──────────┐                  ┌─────────┴──────────────┐
//! │     PageSource      │                  │        PageView        │
//! ├─────────────────────┤                  ├────────────────────────┤
//! │ Offset              │                  │ Tracing                │
//! │ Page Number         │                  │ Signal log             │
//! │ Cursor              │                  │ No-op                  │
//! │ HTTP (JSON)         │                  │                        │
//! └─────────────────────┘                  └────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and constants
pub mod types;

/// Visibility signals and view implementations
pub mod view;

/// Transition table and state machine
pub mod machine;

/// Fetch strategies
pub mod source;

/// Async driver
pub mod paginator;

/// Configuration files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, SharedError};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, Config, HttpSourceConfig, PaginatorConfig};
pub use paginator::{Paginator, PaginatorBuilder};
pub use source::{CursorSource, HttpSource, OffsetSource, PageNumberSource, PageSource};
pub use view::{NoopView, PageView, Signal, SignalLog, TracingView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
