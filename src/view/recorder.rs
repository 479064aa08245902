//! Recording view
//!
//! Keeps every signal in arrival order so callers without a UI can inspect
//! what a view would have shown.

use super::PageView;
use crate::error::Error;
use parking_lot::Mutex;

/// A single notification as received by a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T> {
    /// `show_empty_loading`
    EmptyLoading(bool),
    /// `show_empty_error`, with the error rendered to text
    EmptyError(bool, Option<String>),
    /// `show_empty_view`
    EmptyView(bool),
    /// `show_list`, with a copy of the items
    List(bool, Vec<T>),
    /// `show_error_toast`, with the error rendered to text
    ErrorToast(String),
    /// `show_refresh_spinner`
    RefreshSpinner(bool),
    /// `show_page_spinner`
    PageSpinner(bool),
}

impl<T> Signal<T> {
    /// Whether this signal asserts something visible
    pub fn is_shown(&self) -> bool {
        match self {
            Signal::EmptyLoading(show)
            | Signal::EmptyError(show, _)
            | Signal::EmptyView(show)
            | Signal::List(show, _)
            | Signal::RefreshSpinner(show)
            | Signal::PageSpinner(show) => *show,
            Signal::ErrorToast(_) => true,
        }
    }
}

/// View that records every signal it receives
#[derive(Debug)]
pub struct SignalLog<T> {
    signals: Mutex<Vec<Signal<T>>>,
}

impl<T> Default for SignalLog<T> {
    fn default() -> Self {
        Self {
            signals: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> SignalLog<T> {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<Signal<T>> {
        std::mem::take(&mut *self.signals.lock())
    }

    /// Only the signals that asserted something visible
    pub fn shown(&self) -> Vec<Signal<T>> {
        self.signals
            .lock()
            .iter()
            .filter(|signal| signal.is_shown())
            .cloned()
            .collect()
    }

    /// Items of the most recent `show_list(true, ..)`
    pub fn last_list(&self) -> Option<Vec<T>> {
        self.signals.lock().iter().rev().find_map(|signal| match signal {
            Signal::List(true, items) => Some(items.clone()),
            _ => None,
        })
    }

    /// Number of recorded signals
    pub fn len(&self) -> usize {
        self.signals.lock().len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.signals.lock().is_empty()
    }

    fn record(&self, signal: Signal<T>) {
        self.signals.lock().push(signal);
    }
}

impl<T: Clone + Send + Sync> PageView<T> for SignalLog<T> {
    fn show_empty_loading(&self, show: bool) {
        self.record(Signal::EmptyLoading(show));
    }

    fn show_empty_error(&self, show: bool, error: Option<&Error>) {
        self.record(Signal::EmptyError(show, error.map(ToString::to_string)));
    }

    fn show_empty_view(&self, show: bool) {
        self.record(Signal::EmptyView(show));
    }

    fn show_list(&self, show: bool, items: &[T]) {
        self.record(Signal::List(show, items.to_vec()));
    }

    fn show_error_toast(&self, error: &Error) {
        self.record(Signal::ErrorToast(error.to_string()));
    }

    fn show_refresh_spinner(&self, show: bool) {
        self.record(Signal::RefreshSpinner(show));
    }

    fn show_page_spinner(&self, show: bool) {
        self.record(Signal::PageSpinner(show));
    }
}
