//! View module
//!
//! The notification contract between the paginator and whatever renders it.
//!
//! # Overview
//!
//! The paginator never draws anything. It calls into a [`PageView`] with
//! coarse show/hide signals and the materialized item list:
//! - `PageView` - the contract, every method defaults to a no-op
//! - `NoopView` - ignores everything
//! - `TracingView` - logs every signal through `tracing`
//! - `SignalLog` - records signals for headless consumers and tests

mod guard;
mod recorder;

pub(crate) use guard::{panic_message, GuardedView};
pub use recorder::{Signal, SignalLog};

use crate::error::Error;

/// Receiver of visibility signals.
///
/// Calls are fire-and-forget and happen while the paginator is locked, so an
/// implementation must not call back into the same paginator synchronously.
pub trait PageView<T>: Send + Sync {
    /// Spinner shown while the first page loads and nothing is displayed
    fn show_empty_loading(&self, _show: bool) {}

    /// Full-screen error for a failed first page
    fn show_empty_error(&self, _show: bool, _error: Option<&Error>) {}

    /// Placeholder for a source with no items
    fn show_empty_view(&self, _show: bool) {}

    /// The item list itself
    fn show_list(&self, _show: bool, _items: &[T]) {}

    /// Transient error for a failed refresh or next page
    fn show_error_toast(&self, _error: &Error) {}

    /// Pull-to-refresh style spinner over the list
    fn show_refresh_spinner(&self, _show: bool) {}

    /// Spinner at the end of the list while the next page loads
    fn show_page_spinner(&self, _show: bool) {}
}

/// View that ignores every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopView;

impl<T> PageView<T> for NoopView {}

/// View that logs every signal at debug level
#[derive(Debug, Clone, Default)]
pub struct TracingView {
    name: String,
}

impl TracingView {
    /// Create a tracing view tagged with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<T> PageView<T> for TracingView {
    fn show_empty_loading(&self, show: bool) {
        tracing::debug!(view = %self.name, show, "empty loading");
    }

    fn show_empty_error(&self, show: bool, error: Option<&Error>) {
        match error {
            Some(error) => tracing::debug!(view = %self.name, show, %error, "empty error"),
            None => tracing::debug!(view = %self.name, show, "empty error"),
        }
    }

    fn show_empty_view(&self, show: bool) {
        tracing::debug!(view = %self.name, show, "empty view");
    }

    fn show_list(&self, show: bool, items: &[T]) {
        tracing::debug!(view = %self.name, show, len = items.len(), "list");
    }

    fn show_error_toast(&self, error: &Error) {
        tracing::warn!(view = %self.name, %error, "page load failed");
    }

    fn show_refresh_spinner(&self, show: bool) {
        tracing::debug!(view = %self.name, show, "refresh spinner");
    }

    fn show_page_spinner(&self, show: bool) {
        tracing::debug!(view = %self.name, show, "page spinner");
    }
}
