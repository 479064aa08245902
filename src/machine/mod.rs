//! State machine module
//!
//! The synchronous core of the paginator: item collection, state and the
//! fetch generation bookkeeping.
//!
//! # Overview
//!
//! The machine module provides:
//! - `transition` - pure `(state, event, context) -> transition` table
//! - `Visibility` - entry actions as a function of the entered state
//! - `Machine` - applies transitions, notifies the view and tells the async
//!   driver which fetches to start or abort
//!
//! The machine never awaits anything. Fetch completions come back through
//! [`Machine::deliver`], which acts on whatever state is current at that time
//! and drops completions whose generation is no longer outstanding.

mod transition;
mod types;
mod visibility;

pub use transition::transition;
pub use types::{Command, Context, Effect, Event, FetchKind, ItemOp, State, Transition};
pub use visibility::Visibility;

use crate::error::Result;
use crate::types::{Snapshot, StateKind};
use crate::view::{GuardedView, PageView};
use std::sync::Arc;
use tracing::{debug, warn};

/// Paginator state machine
pub struct Machine<T> {
    /// Loaded items, in display order
    items: Vec<T>,
    /// Current state
    state: State,
    /// Requested page size
    limit: usize,
    /// Notification target
    view: Arc<dyn PageView<T>>,
    /// Last generation handed out
    generation: u64,
    /// Generation of the outstanding fetch
    pending: Option<u64>,
}

impl<T> Machine<T> {
    /// Create a machine in `Idle` and push its entry signals to the view
    pub fn new(view: Arc<dyn PageView<T>>, limit: usize) -> Self {
        let machine = Self {
            items: Vec::new(),
            state: State::Idle,
            limit,
            view,
            generation: 0,
            pending: None,
        };
        machine.show_entry();
        machine
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Kind of the current state
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Requested page size
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the page size used by the next fetch and completion check
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Loaded items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Item at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Generation of the outstanding fetch
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Progress snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.kind(),
            len: self.items.len(),
            loading: self.pending.is_some(),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Run one event through the transition table
    pub fn dispatch(&mut self, event: Event<T>) -> Vec<Command> {
        let name = event.name();
        let ctx = Context {
            has_items: !self.items.is_empty(),
            limit: self.limit,
        };
        let transition = transition(&self.state, event, ctx);
        if transition.is_noop() {
            debug!(event = name, state = %self.kind(), "event ignored");
            return Vec::new();
        }
        self.apply(transition)
    }

    /// Feed back the completion of the fetch tagged `generation`
    pub fn deliver(&mut self, generation: u64, result: Result<Vec<T>>) -> Vec<Command> {
        if self.pending != Some(generation) {
            debug!(
                generation,
                pending = ?self.pending,
                "discarding stale page completion"
            );
            return Vec::new();
        }
        self.pending = None;

        let event = match result {
            Ok(batch) => {
                debug!(generation, received = batch.len(), "page arrived");
                Event::DataArrived(batch)
            }
            Err(error) => {
                debug!(generation, %error, "page fetch failed");
                Event::FetchFailed(Arc::new(error))
            }
        };
        self.dispatch(event)
    }

    /// Re-derive the display state from the current items
    pub fn invalidate(&mut self) {
        self.reconcile();
    }

    fn reconcile(&mut self) {
        let commands = self.dispatch(Event::Reconcile);
        debug_assert!(commands.is_empty(), "reconcile never touches fetches");
    }

    fn apply(&mut self, transition: Transition<T>) -> Vec<Command> {
        let Transition {
            next,
            items,
            effects,
        } = transition;

        match items {
            Some(ItemOp::Clear) => self.items.clear(),
            Some(ItemOp::Replace(batch)) => self.items = batch,
            Some(ItemOp::Append(batch)) => self.items.extend(batch),
            None => {}
        }

        // Fetch bookkeeping settles before the view hears anything
        let mut commands = Vec::new();
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::CancelFetch => {
                    if let Some(generation) = self.pending.take() {
                        debug!(generation, "cancelling fetch");
                        commands.push(Command::Cancel { generation });
                    }
                }
                Effect::IssueFetch(kind) => {
                    if let Some(generation) = self.pending.take() {
                        debug!(generation, "superseding fetch");
                        commands.push(Command::Cancel { generation });
                    }
                    self.generation += 1;
                    self.pending = Some(self.generation);
                    debug!(generation = self.generation, ?kind, limit = self.limit, "issuing fetch");
                    commands.push(Command::Fetch {
                        generation: self.generation,
                        kind,
                    });
                }
                Effect::ShowList | Effect::ShowErrorToast(_) => notices.push(effect),
            }
        }

        if let Some(next) = next {
            debug!(from = %self.kind(), to = %next.kind(), "transition");
            self.state = next;
            self.show_entry();
        }

        let view = self.view();
        for notice in notices {
            match notice {
                Effect::ShowList => view.show_list(true, &self.items),
                Effect::ShowErrorToast(error) => view.show_error_toast(&error),
                Effect::CancelFetch | Effect::IssueFetch(_) => {}
            }
        }
        commands
    }

    /// The notification target with every callback isolated
    fn view(&self) -> GuardedView<'_, T> {
        GuardedView::new(self.view.as_ref())
    }

    fn show_entry(&self) {
        if let Some(visibility) = Visibility::for_state(&self.state) {
            visibility.apply(&self.view(), &self.items);
        }
    }

    // ========================================================================
    // Local mutations
    // ========================================================================

    /// Mutations only apply once loading has started and before release.
    fn accepts_mutation(&self, operation: &'static str) -> bool {
        match self.state {
            State::Idle => {
                debug!(operation, "mutation ignored before start");
                false
            }
            State::Released => {
                warn!(operation, "mutation ignored after release");
                false
            }
            _ => true,
        }
    }

    /// Insert `item` at `at` (clamped, `None` appends) unless an existing
    /// item satisfies `is_duplicate`.
    ///
    /// Returns the insertion index, or `None` when nothing was inserted.
    pub fn insert<F>(&mut self, item: T, at: Option<usize>, is_duplicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        if !self.accepts_mutation("insert") || self.items.iter().any(is_duplicate) {
            return None;
        }
        let index = at.map_or(self.items.len(), |at| at.min(self.items.len()));
        self.items.insert(index, item);
        self.reconcile();
        Some(index)
    }

    /// Remove the first item matching `predicate` and return its index
    pub fn remove_first<F>(&mut self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        if !self.accepts_mutation("remove_first") {
            return None;
        }
        let index = self.items.iter().position(predicate)?;
        self.items.remove(index);
        self.reconcile();
        Some(index)
    }

    /// Remove every item matching `predicate`, returning how many went
    pub fn remove_all<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        if !self.accepts_mutation("remove_all") {
            return 0;
        }
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        self.reconcile();
        before - self.items.len()
    }

    /// Replace the first item matching `predicate` with `sample`.
    ///
    /// The view gets the updated list directly; the state does not change.
    pub fn replace_first<F>(&mut self, sample: T, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        if !self.accepts_mutation("replace_first") {
            return None;
        }
        let index = self.items.iter().position(predicate)?;
        self.items[index] = sample;
        self.view().show_list(true, &self.items);
        Some(index)
    }
}

impl<T> std::fmt::Debug for Machine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.kind())
            .field("len", &self.items.len())
            .field("limit", &self.limit)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
