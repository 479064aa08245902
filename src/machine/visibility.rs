//! Entry actions
//!
//! What a view shows is a pure function of the state just entered.

use super::types::State;
use crate::error::SharedError;
use crate::view::PageView;

/// Visibility signals asserted by a state
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    /// Spinner with nothing else on screen
    pub empty_loading: bool,
    /// Full-screen error, present when shown
    pub empty_error: Option<SharedError>,
    /// Empty placeholder
    pub empty_view: bool,
    /// Item list
    pub list: bool,
    /// Refresh spinner over the list
    pub refresh_spinner: bool,
    /// Spinner after the last item
    pub page_spinner: bool,
}

impl Visibility {
    /// Entry visibility of `state`, `None` for the terminal state
    pub fn for_state(state: &State) -> Option<Self> {
        let hidden = Self::default();
        let visibility = match state {
            State::Idle => hidden,
            State::LoadingFirstPage => Self {
                empty_loading: true,
                ..hidden
            },
            State::LoadFailed(error) => Self {
                empty_error: Some(error.clone()),
                ..hidden
            },
            State::Empty => Self {
                empty_view: true,
                ..hidden
            },
            State::HasMore | State::Complete => Self {
                list: true,
                ..hidden
            },
            State::Refreshing => Self {
                list: true,
                refresh_spinner: true,
                ..hidden
            },
            State::LoadingNextPage => Self {
                list: true,
                page_spinner: true,
                ..hidden
            },
            State::Released => return None,
        };
        Some(visibility)
    }

    /// Push the signals to a view, hiding before showing.
    pub fn apply<T>(&self, view: &dyn PageView<T>, items: &[T]) {
        if !self.refresh_spinner {
            view.show_refresh_spinner(false);
        }
        if !self.page_spinner {
            view.show_page_spinner(false);
        }
        if !self.empty_view {
            view.show_empty_view(false);
        }
        if !self.empty_loading {
            view.show_empty_loading(false);
        }
        if self.empty_error.is_none() {
            view.show_empty_error(false, None);
        }
        if !self.list {
            view.show_list(false, items);
        }

        if self.empty_loading {
            view.show_empty_loading(true);
        }
        if let Some(error) = &self.empty_error {
            view.show_empty_error(true, Some(error));
        }
        if self.empty_view {
            view.show_empty_view(true);
        }
        if self.list {
            view.show_list(true, items);
        }
        if self.refresh_spinner {
            view.show_refresh_spinner(true);
        }
        if self.page_spinner {
            view.show_page_spinner(true);
        }
    }
}
