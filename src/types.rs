//! Common types used throughout pagewise
//!
//! Shared constants, the payload-free state kind and the progress snapshot
//! published by the async driver.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Page Limits
// ============================================================================

/// Page size used when none is configured
pub const DEFAULT_LIMIT: usize = 10;

/// Sentinel page limit: a single unbounded request, always complete
pub const SINGLE_PAGE_LIMIT: usize = 0;

/// Decide whether a received batch is the last page.
///
/// True when the single-page sentinel is in effect or the batch is strictly
/// shorter than the requested limit.
pub fn is_last_page(limit: usize, received: usize) -> bool {
    limit == SINGLE_PAGE_LIMIT || received < limit
}

// ============================================================================
// State Kind
// ============================================================================

/// Payload-free mirror of the paginator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Constructed, nothing requested yet
    #[default]
    Idle,
    /// First page requested, nothing to show
    LoadingFirstPage,
    /// First page request failed
    LoadFailed,
    /// Source has no items at all
    Empty,
    /// Items shown, more pages expected
    HasMore,
    /// Items shown while the first page is re-fetched
    Refreshing,
    /// Items shown while the next page is fetched
    LoadingNextPage,
    /// Items shown, last page reached
    Complete,
    /// Terminal, inert
    Released,
}

impl StateKind {
    /// States in which the item collection is non-empty
    pub fn has_items(self) -> bool {
        matches!(
            self,
            StateKind::HasMore
                | StateKind::Refreshing
                | StateKind::LoadingNextPage
                | StateKind::Complete
        )
    }

    /// Terminal state check
    pub fn is_released(self) -> bool {
        self == StateKind::Released
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::LoadingFirstPage => "loading_first_page",
            StateKind::LoadFailed => "load_failed",
            StateKind::Empty => "empty",
            StateKind::HasMore => "has_more",
            StateKind::Refreshing => "refreshing",
            StateKind::LoadingNextPage => "loading_next_page",
            StateKind::Complete => "complete",
            StateKind::Released => "released",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Progress snapshot published after every paginator entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    /// Current state
    pub state: StateKind,
    /// Number of loaded items
    pub len: usize,
    /// Whether a fetch is outstanding
    pub loading: bool,
}

impl Snapshot {
    /// No fetch outstanding
    pub fn is_settled(&self) -> bool {
        !self.loading
    }
}
