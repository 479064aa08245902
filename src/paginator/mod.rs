//! Paginator module
//!
//! The async driver around the state machine.
//!
//! # Overview
//!
//! The paginator module provides:
//! - `Paginator` - cloneable handle; every entry point is synchronous and
//!   serialized behind one lock
//! - `PaginatorBuilder` - wires a fetch strategy, a view and a page limit
//!
//! Fetches run as tokio tasks. A task holds only a weak reference back to
//! the paginator and re-enters it through the same lock when the page
//! arrives. Superseded fetches are aborted; the generation check in the
//! machine drops any completion that still gets through.

use crate::config::PaginatorConfig;
use crate::error::{Error, Result, SharedError};
use crate::machine::{Command, Event, FetchKind, Machine, State};
use crate::source::PageSource;
use crate::types::{Snapshot, StateKind, DEFAULT_LIMIT};
use crate::view::{panic_message, NoopView, PageView};
use futures::FutureExt;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Paged-data controller
pub struct Paginator<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Paginator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    core: Mutex<Core<T>>,
    runtime: Handle,
    updates: watch::Sender<Snapshot>,
}

struct Core<T> {
    machine: Machine<T>,
    source: Arc<dyn PageSource<T>>,
    /// Outstanding fetch task and its generation
    task: Option<(u64, JoinHandle<()>)>,
}

impl<T> Drop for Core<T> {
    fn drop(&mut self) {
        if let Some((generation, handle)) = self.task.take() {
            debug!(generation, "paginator dropped, aborting fetch");
            handle.abort();
        }
    }
}

impl<T: Send + 'static> Core<T> {
    fn execute(&mut self, shared: &Weak<Shared<T>>, runtime: &Handle, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Cancel { generation } => {
                    if let Some((running, handle)) = self.task.take() {
                        debug!(generation, running, "aborting fetch task");
                        handle.abort();
                    }
                }
                Command::Fetch { generation, kind } => {
                    let existing = match kind {
                        FetchKind::FirstPage => None,
                        FetchKind::NextPage => Some(self.machine.items()),
                    };
                    let limit = self.machine.limit();
                    let loaded = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.source.load_page(existing, limit)
                    }));
                    let page = match loaded {
                        Ok(page) => AssertUnwindSafe(page).catch_unwind().boxed(),
                        Err(payload) => futures::future::ready(Err(payload)).boxed(),
                    };
                    let shared = shared.clone();
                    let handle = runtime.spawn(async move {
                        let result = page.await.unwrap_or_else(|payload| {
                            let message = panic_message(payload.as_ref());
                            error!(generation, panic = %message, "fetch strategy panicked");
                            Err(Error::fetch(format!("fetch strategy panicked: {message}")))
                        });
                        if let Some(shared) = shared.upgrade() {
                            shared.complete(generation, result);
                        }
                    });
                    self.task = Some((generation, handle));
                }
            }
        }
    }
}

impl<T: Send + 'static> Shared<T> {
    /// Run `f` under the lock, execute the commands it returns and publish
    /// a snapshot. Panics are logged and reported as `None`.
    fn run<R>(
        self: &Arc<Self>,
        operation: &'static str,
        f: impl FnOnce(&mut Core<T>) -> (R, Vec<Command>),
    ) -> Option<R> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut core = self.core.lock();
            let (value, commands) = f(&mut core);
            core.execute(&Arc::downgrade(self), &self.runtime, commands);
            self.publish(&core);
            value
        }));

        match outcome {
            Ok(value) => Some(value),
            Err(payload) => {
                error!(
                    operation,
                    panic = %panic_message(payload.as_ref()),
                    "paginator operation panicked"
                );
                self.publish(&self.core.lock());
                None
            }
        }
    }

    /// Publish while still holding the lock so snapshots keep lock order
    fn publish(&self, core: &Core<T>) {
        self.updates.send_replace(core.machine.snapshot());
    }

    fn complete(self: &Arc<Self>, generation: u64, result: Result<Vec<T>>) {
        self.run("complete", |core| {
            if core.task.as_ref().is_some_and(|(running, _)| *running == generation) {
                core.task = None;
            }
            ((), core.machine.deliver(generation, result))
        });
    }
}

impl<T: Clone + Send + 'static> Paginator<T> {
    /// Start building a paginator over `source`
    pub fn builder(source: impl PageSource<T> + 'static) -> PaginatorBuilder<T> {
        PaginatorBuilder::new(Arc::new(source))
    }

    /// Paginator with a view and page limit on the current runtime
    pub fn new(
        source: impl PageSource<T> + 'static,
        view: impl PageView<T> + 'static,
        limit: usize,
    ) -> Result<Self> {
        Self::builder(source).view(view).limit(limit).build()
    }

    fn dispatch(&self, event: Event<T>) {
        let operation = event.name();
        self.shared
            .run(operation, |core| ((), core.machine.dispatch(event)));
    }

    fn mutate<R>(&self, operation: &'static str, f: impl FnOnce(&mut Machine<T>) -> R) -> Option<R> {
        self.shared
            .run(operation, |core| (f(&mut core.machine), Vec::new()))
    }

    fn read<R>(&self, f: impl FnOnce(&Machine<T>) -> R) -> R {
        f(&self.shared.core.lock().machine)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Drop loaded items and load the first page
    pub fn start(&self) {
        self.dispatch(Event::Start);
    }

    /// Re-fetch the first page; `force` restarts a refresh already running
    pub fn refresh(&self, force: bool) {
        self.dispatch(Event::Refresh { force });
    }

    /// Fetch the page after the loaded items, if more are expected
    pub fn load_more(&self) {
        self.dispatch(Event::LoadMore);
    }

    /// Release the paginator: clear items, cancel the fetch, ignore
    /// everything afterwards
    pub fn stop(&self) {
        self.dispatch(Event::Stop);
    }

    /// Re-derive the display state from the items
    pub fn invalidate(&self) {
        let _ = self.mutate("invalidate", Machine::invalidate);
    }

    // ========================================================================
    // Local mutations
    // ========================================================================

    /// Insert `item` at `at` (clamped, `None` appends) unless an existing
    /// item satisfies `is_duplicate`. Returns the insertion index.
    pub fn insert<F>(&self, item: T, at: Option<usize>, is_duplicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.mutate("insert", |machine| machine.insert(item, at, is_duplicate))
            .flatten()
    }

    /// Append `item`
    pub fn push(&self, item: T) -> Option<usize> {
        self.insert(item, None, |_| false)
    }

    /// Remove the first item matching `predicate`, returning its index
    pub fn remove_first<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.mutate("remove_first", |machine| machine.remove_first(predicate))
            .flatten()
    }

    /// Remove every item matching `predicate`, returning how many went
    pub fn remove_all<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.mutate("remove_all", |machine| machine.remove_all(predicate))
            .unwrap_or(0)
    }

    /// Replace the first item matching `predicate` with `sample`
    pub fn replace_first<F>(&self, sample: T, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.mutate("replace_first", |machine| {
            machine.replace_first(sample, predicate)
        })
        .flatten()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Item at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<T> {
        self.read(|machine| machine.get(index).cloned())
    }

    /// Copy of the loaded items
    pub fn items(&self) -> Vec<T> {
        self.read(|machine| machine.items().to_vec())
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.read(Machine::len)
    }

    /// Whether no items are loaded
    pub fn is_empty(&self) -> bool {
        self.read(Machine::is_empty)
    }

    /// Current state
    pub fn state(&self) -> StateKind {
        self.read(Machine::kind)
    }

    /// Error behind a failed first page
    pub fn error(&self) -> Option<SharedError> {
        self.read(|machine| match machine.state() {
            State::LoadFailed(error) => Some(Arc::clone(error)),
            _ => None,
        })
    }

    /// Requested page size
    pub fn limit(&self) -> usize {
        self.read(Machine::limit)
    }

    /// Change the page size for subsequent fetches
    pub fn set_limit(&self, limit: usize) {
        let _ = self.mutate("set_limit", |machine| machine.set_limit(limit));
    }

    /// Current progress snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.read(Machine::snapshot)
    }

    /// Subscribe to the snapshots published after every entry point
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    /// Wait until no fetch is outstanding
    pub async fn settled(&self) -> Snapshot {
        let mut updates = self.watch();
        let settled = updates.wait_for(Snapshot::is_settled).await.map(|s| *s);
        match settled {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("snapshot", &*self.shared.updates.borrow())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Paginator`]
pub struct PaginatorBuilder<T> {
    source: Arc<dyn PageSource<T>>,
    view: Arc<dyn PageView<T>>,
    limit: usize,
    runtime: Option<Handle>,
}

impl<T: Clone + Send + 'static> PaginatorBuilder<T> {
    /// Builder with a no-op view and the default limit
    pub fn new(source: Arc<dyn PageSource<T>>) -> Self {
        Self {
            source,
            view: Arc::new(NoopView),
            limit: DEFAULT_LIMIT,
            runtime: None,
        }
    }

    /// Set the notification target
    #[must_use]
    pub fn view(mut self, view: impl PageView<T> + 'static) -> Self {
        self.view = Arc::new(view);
        self
    }

    /// Set a shared notification target
    #[must_use]
    pub fn shared_view(mut self, view: Arc<dyn PageView<T>>) -> Self {
        self.view = view;
        self
    }

    /// Set the page limit, `SINGLE_PAGE_LIMIT` for a single request
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Apply paginator settings from config
    #[must_use]
    pub fn config(self, config: &PaginatorConfig) -> Self {
        self.limit(config.limit)
    }

    /// Run fetches on this runtime instead of the current one
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the paginator in `Idle`
    pub fn build(self) -> Result<Paginator<T>> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let machine = Machine::new(self.view, self.limit);
        let (updates, _) = watch::channel(machine.snapshot());

        Ok(Paginator {
            shared: Arc::new(Shared {
                core: Mutex::new(Core {
                    machine,
                    source: self.source,
                    task: None,
                }),
                runtime,
                updates,
            }),
        })
    }
}
