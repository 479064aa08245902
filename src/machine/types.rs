//! State machine types
//!
//! States, events and the side effects a transition asks for.

use crate::error::SharedError;
use crate::types::StateKind;

/// Paginator state, exactly one active at a time
#[derive(Debug, Clone, Default)]
pub enum State {
    /// Constructed, nothing requested yet
    #[default]
    Idle,
    /// First page requested, nothing to show
    LoadingFirstPage,
    /// First page request failed with this error
    LoadFailed(SharedError),
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

impl State {
    /// Payload-free kind of this state
    pub fn kind(&self) -> StateKind {
        match self {
            State::Idle => StateKind::Idle,
            State::LoadingFirstPage => StateKind::LoadingFirstPage,
            State::LoadFailed(_) => StateKind::LoadFailed,
            State::Empty => StateKind::Empty,
            State::HasMore => StateKind::HasMore,
            State::Refreshing => StateKind::Refreshing,
            State::LoadingNextPage => StateKind::LoadingNextPage,
            State::Complete => StateKind::Complete,
            State::Released => StateKind::Released,
        }
    }

    /// Terminal state check
    pub fn is_released(&self) -> bool {
        matches!(self, State::Released)
    }
}

/// Input to the state machine
#[derive(Debug, Clone)]
pub enum Event<T> {
    /// Drop everything and load the first page
    Start,
    /// Re-fetch the first page, keeping items visible when possible
    Refresh {
        /// Restart a refresh that is already running
        force: bool,
    },
    /// Fetch the page after the loaded items
    LoadMore,
    /// Release the paginator
    Stop,
    /// The outstanding fetch produced a batch
    DataArrived(Vec<T>),
    /// The outstanding fetch failed
    FetchFailed(SharedError),
    /// Re-derive the display state from the items after a local edit
    Reconcile,
}

impl<T> Event<T> {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Refresh { force: false } => "refresh",
            Event::Refresh { force: true } => "force_refresh",
            Event::LoadMore => "load_more",
            Event::Stop => "stop",
            Event::DataArrived(_) => "data_arrived",
            Event::FetchFailed(_) => "fetch_failed",
            Event::Reconcile => "reconcile",
        }
    }
}

/// Which page a fetch asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// No existing items are passed to the strategy
    FirstPage,
    /// The loaded items are passed so the strategy can continue after them
    NextPage,
}

/// Change to the item collection, applied before the next state is entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOp<T> {
    /// Remove every item
    Clear,
    /// Replace every item with a fresh first page
    Replace(Vec<T>),
    /// Append a page after the loaded items
    Append(Vec<T>),
}

/// Side effect applied after the next state is entered, in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Cancel the outstanding fetch, if any
    CancelFetch,
    /// Cancel the outstanding fetch, if any, and issue a new one
    IssueFetch(FetchKind),
    /// Push the current items to the view without changing state
    ShowList,
    /// Surface a transient error
    ShowErrorToast(SharedError),
}

/// Facts about the paginator a transition may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Whether the item collection is non-empty
    pub has_items: bool,
    /// Requested page size, `SINGLE_PAGE_LIMIT` for a single request
    pub limit: usize,
}

/// Outcome of a transition: optional next state plus effects
#[derive(Debug, Clone)]
pub struct Transition<T> {
    /// State to enter; entry actions run even when it equals the current one
    pub next: Option<State>,
    /// Change to the item collection
    pub items: Option<ItemOp<T>>,
    /// Effects in application order
    pub effects: Vec<Effect>,
}

impl<T> Transition<T> {
    /// Nothing happens
    pub fn stay() -> Self {
        Self {
            next: None,
            items: None,
            effects: Vec::new(),
        }
    }

    /// Enter a state
    pub fn to(state: State) -> Self {
        Self {
            next: Some(state),
            ..Self::stay()
        }
    }

    /// Attach an item operation
    #[must_use]
    pub fn items(mut self, op: ItemOp<T>) -> Self {
        self.items = Some(op);
        self
    }

    /// Append an effect
    #[must_use]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the transition does nothing at all
    pub fn is_noop(&self) -> bool {
        self.next.is_none() && self.items.is_none() && self.effects.is_empty()
    }

    /// Kind of the state to enter, if any
    pub fn next_kind(&self) -> Option<StateKind> {
        self.next.as_ref().map(State::kind)
    }

    /// The fetch this transition issues, if any
    pub fn issued_fetch(&self) -> Option<FetchKind> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::IssueFetch(kind) => Some(*kind),
            _ => None,
        })
    }
}

/// Instruction for the async driver produced by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Abort the fetch tagged with this generation
    Cancel {
        /// Generation of the fetch to abort
        generation: u64,
    },
    /// Start a fetch tagged with this generation
    Fetch {
        /// Generation the completion must carry
        generation: u64,
        /// Which page to request
        kind: FetchKind,
    },
}
