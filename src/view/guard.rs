//! Panic isolation for view callbacks

use super::PageView;
use crate::error::Error;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Forwards every signal to the wrapped view and swallows its panics.
///
/// A panicking callback loses only its own signal; the signals after it
/// and the machine bookkeeping around it still happen.
pub(crate) struct GuardedView<'a, T> {
    inner: &'a dyn PageView<T>,
}

impl<'a, T> GuardedView<'a, T> {
    pub(crate) fn new(inner: &'a dyn PageView<T>) -> Self {
        Self { inner }
    }

    fn guard(&self, signal: &'static str, notify: impl FnOnce(&dyn PageView<T>)) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| notify(self.inner))) {
            error!(
                signal,
                panic = %panic_message(payload.as_ref()),
                "view callback panicked"
            );
        }
    }
}

impl<T> PageView<T> for GuardedView<'_, T> {
    fn show_empty_loading(&self, show: bool) {
        self.guard("show_empty_loading", |view| view.show_empty_loading(show));
    }

    fn show_empty_error(&self, show: bool, error: Option<&Error>) {
        self.guard("show_empty_error", |view| view.show_empty_error(show, error));
    }

    fn show_empty_view(&self, show: bool) {
        self.guard("show_empty_view", |view| view.show_empty_view(show));
    }

    fn show_list(&self, show: bool, items: &[T]) {
        self.guard("show_list", |view| view.show_list(show, items));
    }

    fn show_error_toast(&self, error: &Error) {
        self.guard("show_error_toast", |view| view.show_error_toast(error));
    }

    fn show_refresh_spinner(&self, show: bool) {
        self.guard("show_refresh_spinner", |view| view.show_refresh_spinner(show));
    }

    fn show_page_spinner(&self, show: bool) {
        self.guard("show_page_spinner", |view| view.show_page_spinner(show));
    }
}

/// Render a panic payload for logging
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
