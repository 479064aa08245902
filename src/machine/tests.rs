//! Tests for the state machine

use super::*;
use crate::error::Error;
use crate::types::SINGLE_PAGE_LIMIT;
use crate::view::{Signal, SignalLog};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn ctx(has_items: bool, limit: usize) -> Context {
    Context { has_items, limit }
}

fn failure(message: &str) -> crate::error::SharedError {
    Arc::new(Error::fetch(message))
}

fn machine(limit: usize) -> (Machine<u32>, Arc<SignalLog<u32>>) {
    let log = Arc::new(SignalLog::new());
    let machine = Machine::new(log.clone(), limit);
    log.take();
    (machine, log)
}

fn fetched(commands: &[Command]) -> Option<(u64, FetchKind)> {
    commands.iter().find_map(|command| match command {
        Command::Fetch { generation, kind } => Some((*generation, *kind)),
        Command::Cancel { .. } => None,
    })
}

/// Start and answer the first fetch with `batch`
fn loaded(limit: usize, batch: Vec<u32>) -> (Machine<u32>, Arc<SignalLog<u32>>) {
    let (mut machine, log) = machine(limit);
    let commands = machine.dispatch(Event::Start);
    let (generation, _) = fetched(&commands).unwrap();
    machine.deliver(generation, Ok(batch));
    log.take();
    (machine, log)
}

/// Number of asserted empty-* or list signals
fn primary_count(visibility: &Visibility) -> usize {
    [
        visibility.empty_loading,
        visibility.empty_error.is_some(),
        visibility.empty_view,
        visibility.list,
    ]
    .into_iter()
    .filter(|shown| *shown)
    .count()
}

fn assert_items_invariant(machine: &Machine<u32>) {
    assert_eq!(
        !machine.is_empty(),
        machine.kind().has_items(),
        "items/state mismatch in {:?}",
        machine
    );
}

// ============================================================================
// Transition Table Tests
// ============================================================================

#[test]
fn test_start_from_idle_clears_and_loads_first_page() {
    let t = transition::<u32>(&State::Idle, Event::Start, ctx(false, 5));
    assert_eq!(t.next_kind(), Some(StateKind::LoadingFirstPage));
    assert_eq!(t.items, Some(ItemOp::Clear));
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test]
fn test_start_while_loading_first_page_reissues_without_reentry() {
    let t = transition::<u32>(&State::LoadingFirstPage, Event::Start, ctx(false, 5));
    assert!(t.next.is_none());
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test_case(State::HasMore ; "has more")]
#[test_case(State::Refreshing ; "refreshing")]
#[test_case(State::LoadingNextPage ; "loading next page")]
#[test_case(State::Complete ; "complete")]
#[test_case(State::LoadFailed(Arc::new(Error::fetch("x"))) ; "load failed")]
fn test_start_with_items_restarts(state: State) {
    let t = transition::<u32>(&state, Event::Start, ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::LoadingFirstPage));
    assert_eq!(t.items, Some(ItemOp::Clear));
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test_case(State::HasMore ; "has more")]
#[test_case(State::LoadingNextPage ; "loading next page")]
#[test_case(State::Complete ; "complete")]
fn test_refresh_with_items_enters_refreshing(state: State) {
    let t = transition::<u32>(&state, Event::Refresh { force: false }, ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::Refreshing));
    assert!(t.items.is_none());
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test_case(State::Idle ; "idle")]
#[test_case(State::Empty ; "empty")]
#[test_case(State::LoadFailed(Arc::new(Error::fetch("x"))) ; "load failed")]
fn test_refresh_without_items_loads_first_page(state: State) {
    let t = transition::<u32>(&state, Event::Refresh { force: false }, ctx(false, 5));
    assert_eq!(t.next_kind(), Some(StateKind::LoadingFirstPage));
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test]
fn test_refresh_while_refreshing_needs_force() {
    let t = transition::<u32>(&State::Refreshing, Event::Refresh { force: false }, ctx(true, 5));
    assert!(t.is_noop());

    let t = transition::<u32>(&State::Refreshing, Event::Refresh { force: true }, ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::Refreshing));
    assert_eq!(t.issued_fetch(), Some(FetchKind::FirstPage));
}

#[test]
fn test_refresh_while_loading_first_page_is_noop() {
    let t = transition::<u32>(
        &State::LoadingFirstPage,
        Event::Refresh { force: true },
        ctx(false, 5),
    );
    assert!(t.is_noop());
}

#[test]
fn test_load_more_only_from_has_more() {
    let t = transition::<u32>(&State::HasMore, Event::LoadMore, ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::LoadingNextPage));
    assert_eq!(t.issued_fetch(), Some(FetchKind::NextPage));

    for state in [
        State::Idle,
        State::LoadingFirstPage,
        State::Empty,
        State::Refreshing,
        State::LoadingNextPage,
        State::Complete,
        State::Released,
    ] {
        let t = transition::<u32>(&state, Event::LoadMore, ctx(true, 5));
        assert!(t.is_noop(), "load_more in {:?}", state.kind());
    }
}

#[test]
fn test_stop_clears_and_cancels_from_any_live_state() {
    for state in [
        State::Idle,
        State::LoadingFirstPage,
        State::LoadFailed(failure("x")),
        State::Empty,
        State::HasMore,
        State::Refreshing,
        State::LoadingNextPage,
        State::Complete,
    ] {
        let t = transition::<u32>(&state, Event::Stop, ctx(true, 5));
        assert_eq!(t.next_kind(), Some(StateKind::Released));
        assert_eq!(t.items, Some(ItemOp::Clear));
        assert!(matches!(t.effects.as_slice(), [Effect::CancelFetch]));
    }
}

#[test]
fn test_released_ignores_everything() {
    let events: Vec<Event<u32>> = vec![
        Event::Start,
        Event::Refresh { force: true },
        Event::LoadMore,
        Event::Stop,
        Event::DataArrived(vec![1]),
        Event::FetchFailed(failure("x")),
        Event::Reconcile,
    ];
    for event in events {
        let name = event.name();
        let t = transition(&State::Released, event, ctx(true, 5));
        assert!(t.is_noop(), "{name} in released");
    }
}

#[test_case(5, 5, StateKind::HasMore ; "full page")]
#[test_case(5, 3, StateKind::Complete ; "short page")]
#[test_case(5, 7, StateKind::HasMore ; "oversized page")]
#[test_case(SINGLE_PAGE_LIMIT, 1, StateKind::Complete ; "single page one item")]
#[test_case(SINGLE_PAGE_LIMIT, 50, StateKind::Complete ; "single page many items")]
fn test_first_page_completion(limit: usize, received: u32, expected: StateKind) {
    let batch: Vec<u32> = (0..received).collect();
    let t = transition(&State::LoadingFirstPage, Event::DataArrived(batch.clone()), ctx(false, limit));
    assert_eq!(t.next_kind(), Some(expected));
    assert_eq!(t.items, Some(ItemOp::Replace(batch)));
}

#[test]
fn test_empty_first_page_means_empty_not_complete() {
    let t = transition::<u32>(&State::LoadingFirstPage, Event::DataArrived(vec![]), ctx(false, 5));
    assert_eq!(t.next_kind(), Some(StateKind::Empty));
    assert_eq!(t.items, Some(ItemOp::Clear));

    let t = transition::<u32>(&State::Refreshing, Event::DataArrived(vec![]), ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::Empty));
    assert_eq!(t.items, Some(ItemOp::Clear));
}

#[test_case(vec![1, 2, 3, 4, 5], StateKind::HasMore ; "full page")]
#[test_case(vec![1, 2], StateKind::Complete ; "short page")]
#[test_case(vec![], StateKind::Complete ; "empty page")]
fn test_next_page_appends(batch: Vec<u32>, expected: StateKind) {
    let t = transition(&State::LoadingNextPage, Event::DataArrived(batch.clone()), ctx(true, 5));
    assert_eq!(t.next_kind(), Some(expected));
    assert_eq!(t.items, Some(ItemOp::Append(batch)));
}

#[test]
fn test_failure_recovery_depends_on_state() {
    let t = transition::<u32>(&State::LoadingFirstPage, Event::FetchFailed(failure("a")), ctx(false, 5));
    assert_eq!(t.next_kind(), Some(StateKind::LoadFailed));
    assert!(t.effects.is_empty());

    let t = transition::<u32>(&State::Refreshing, Event::FetchFailed(failure("b")), ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::HasMore));
    assert!(t.items.is_none());
    assert!(matches!(t.effects.as_slice(), [Effect::ShowErrorToast(_)]));

    let t = transition::<u32>(&State::LoadingNextPage, Event::FetchFailed(failure("c")), ctx(true, 5));
    assert_eq!(t.next_kind(), Some(StateKind::HasMore));
    assert!(matches!(t.effects.as_slice(), [Effect::ShowErrorToast(_)]));

    let t = transition::<u32>(&State::LoadingNextPage, Event::FetchFailed(failure("d")), ctx(false, 5));
    assert_eq!(t.next_kind(), Some(StateKind::Empty));
}

#[test]
fn test_completions_outside_loading_states_are_ignored() {
    for state in [State::Idle, State::Empty, State::HasMore, State::Complete] {
        let t = transition(&state, Event::DataArrived(vec![1u32]), ctx(true, 5));
        assert!(t.is_noop());
        let t = transition::<u32>(&state, Event::FetchFailed(failure("x")), ctx(true, 5));
        assert!(t.is_noop());
    }
}

#[test]
fn test_reconcile_table() {
    let cases: Vec<(State, bool, Option<StateKind>, bool)> = vec![
        (State::Idle, true, None, false),
        (State::LoadingFirstPage, true, Some(StateKind::LoadingNextPage), false),
        (State::LoadingFirstPage, false, None, false),
        (State::LoadFailed(failure("x")), true, Some(StateKind::HasMore), false),
        (State::LoadFailed(failure("x")), false, None, false),
        (State::Empty, true, Some(StateKind::HasMore), false),
        (State::Empty, false, None, false),
        (State::HasMore, false, Some(StateKind::Empty), false),
        (State::HasMore, true, None, true),
        (State::Complete, false, Some(StateKind::Empty), false),
        (State::Complete, true, None, true),
        (State::Refreshing, false, Some(StateKind::LoadingFirstPage), false),
        (State::Refreshing, true, None, true),
        (State::LoadingNextPage, false, Some(StateKind::LoadingFirstPage), false),
        (State::LoadingNextPage, true, None, true),
    ];

    for (state, has_items, expected, reshow) in cases {
        let kind = state.kind();
        let t = transition::<u32>(&state, Event::Reconcile, ctx(has_items, 5));
        assert_eq!(t.next_kind(), expected, "reconcile in {kind} (items: {has_items})");
        assert_eq!(
            matches!(t.effects.as_slice(), [Effect::ShowList]),
            reshow,
            "reshow in {kind} (items: {has_items})"
        );
        assert!(t.issued_fetch().is_none());
    }
}

// ============================================================================
// Visibility Tests
// ============================================================================

#[test]
fn test_exactly_one_primary_signal_per_live_state() {
    for state in [
        State::LoadingFirstPage,
        State::LoadFailed(failure("x")),
        State::Empty,
        State::HasMore,
        State::Refreshing,
        State::LoadingNextPage,
        State::Complete,
    ] {
        let visibility = Visibility::for_state(&state).unwrap();
        assert_eq!(primary_count(&visibility), 1, "{}", state.kind());
    }

    let idle = Visibility::for_state(&State::Idle).unwrap();
    assert_eq!(primary_count(&idle), 0);
    assert!(Visibility::for_state(&State::Released).is_none());
}

#[test]
fn test_visibility_hides_before_showing() {
    let log = SignalLog::<u32>::new();
    Visibility::for_state(&State::LoadingNextPage)
        .unwrap()
        .apply(&log, &[1, 2]);

    assert_eq!(
        log.signals(),
        vec![
            Signal::RefreshSpinner(false),
            Signal::EmptyView(false),
            Signal::EmptyLoading(false),
            Signal::EmptyError(false, None),
            Signal::List(true, vec![1, 2]),
            Signal::PageSpinner(true),
        ]
    );
}

// ============================================================================
// Machine Tests
// ============================================================================

#[test]
fn test_new_machine_hides_everything() {
    let log = Arc::new(SignalLog::<u32>::new());
    let machine = Machine::new(log.clone(), 5);
    assert_eq!(machine.kind(), StateKind::Idle);
    assert!(log.shown().is_empty());
    assert_eq!(log.len(), 6);
}

#[test]
fn test_start_issues_first_page_fetch() {
    let (mut machine, log) = machine(5);
    let commands = machine.dispatch(Event::Start);

    assert_eq!(
        commands,
        vec![Command::Fetch {
            generation: 1,
            kind: FetchKind::FirstPage
        }]
    );
    assert_eq!(machine.kind(), StateKind::LoadingFirstPage);
    assert_eq!(machine.pending(), Some(1));
    assert_eq!(log.shown(), vec![Signal::EmptyLoading(true)]);
}

#[test]
fn test_first_page_failure_shows_empty_error_without_list() {
    let (mut machine, log) = machine(5);
    machine.dispatch(Event::Start);
    machine.deliver(1, Err(Error::fetch("E")));

    assert_eq!(machine.kind(), StateKind::LoadFailed);
    assert!(machine.pending().is_none());
    let shown = log.shown();
    assert!(shown.contains(&Signal::EmptyError(true, Some("Fetch failed: E".to_string()))));
    assert!(!shown.iter().any(|s| matches!(s, Signal::List(true, _))));
    assert!(!shown.iter().any(|s| matches!(s, Signal::ErrorToast(_))));
}

#[test]
fn test_limit_five_full_and_short_first_pages() {
    let (machine, _) = loaded(5, vec![1, 2, 3, 4, 5]);
    assert_eq!(machine.kind(), StateKind::HasMore);

    let (machine, _) = loaded(5, vec![1, 2, 3]);
    assert_eq!(machine.kind(), StateKind::Complete);

    let (machine, _) = loaded(SINGLE_PAGE_LIMIT, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(machine.kind(), StateKind::Complete);
}

#[test]
fn test_load_more_scenario() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3, 4, 5]);

    let commands = machine.dispatch(Event::LoadMore);
    let (generation, kind) = fetched(&commands).unwrap();
    assert_eq!(kind, FetchKind::NextPage);
    assert!(log.signals().contains(&Signal::PageSpinner(true)));
    log.take();

    machine.deliver(generation, Ok(vec![6, 7]));
    assert_eq!(machine.kind(), StateKind::Complete);
    assert_eq!(machine.len(), 7);
    let signals = log.signals();
    assert!(signals.contains(&Signal::PageSpinner(false)));
    assert_eq!(log.last_list(), Some(vec![1, 2, 3, 4, 5, 6, 7]));
}

#[test]
fn test_load_more_in_complete_never_fetches() {
    let (mut machine, _) = loaded(5, vec![1, 2]);
    assert_eq!(machine.kind(), StateKind::Complete);
    assert!(machine.dispatch(Event::LoadMore).is_empty());
    assert!(machine.pending().is_none());
}

#[test]
fn test_refresh_during_next_page_cancels_page_fetch() {
    let (mut machine, _) = loaded(5, vec![1, 2, 3, 4, 5]);
    let (page_generation, _) = fetched(&machine.dispatch(Event::LoadMore)).unwrap();

    let commands = machine.dispatch(Event::Refresh { force: false });
    assert_eq!(
        commands,
        vec![
            Command::Cancel {
                generation: page_generation
            },
            Command::Fetch {
                generation: page_generation + 1,
                kind: FetchKind::FirstPage
            },
        ]
    );
    assert_eq!(machine.kind(), StateKind::Refreshing);

    // A late page completion is dropped
    assert!(machine.deliver(page_generation, Ok(vec![6])).is_empty());
    assert_eq!(machine.kind(), StateKind::Refreshing);
    assert_eq!(machine.len(), 5);
}

#[test]
fn test_refresh_replaces_items() {
    let (mut machine, _) = loaded(5, vec![1, 2, 3, 4, 5]);
    let (generation, _) = fetched(&machine.dispatch(Event::Refresh { force: false })).unwrap();
    machine.deliver(generation, Ok(vec![9, 8]));

    assert_eq!(machine.items(), &[9, 8]);
    assert_eq!(machine.kind(), StateKind::Complete);
}

#[test]
fn test_refresh_is_not_duplicated_unless_forced() {
    let (mut machine, _) = loaded(5, vec![1, 2, 3, 4, 5]);
    let (first, _) = fetched(&machine.dispatch(Event::Refresh { force: false })).unwrap();

    assert!(machine.dispatch(Event::Refresh { force: false }).is_empty());
    assert_eq!(machine.pending(), Some(first));

    let commands = machine.dispatch(Event::Refresh { force: true });
    assert_eq!(commands[0], Command::Cancel { generation: first });
    assert_eq!(machine.pending(), Some(first + 1));
}

#[test]
fn test_refresh_failure_keeps_items_and_toasts() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3, 4, 5]);
    let (generation, _) = fetched(&machine.dispatch(Event::Refresh { force: false })).unwrap();
    log.take();

    machine.deliver(generation, Err(Error::http_status(500, "oops")));
    assert_eq!(machine.kind(), StateKind::HasMore);
    assert_eq!(machine.len(), 5);
    assert_eq!(
        log.signals().last(),
        Some(&Signal::ErrorToast("HTTP 500: oops".to_string()))
    );
}

#[test]
fn test_stop_releases_and_cancels() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3, 4, 5]);
    let (generation, _) = fetched(&machine.dispatch(Event::LoadMore)).unwrap();
    log.take();

    let commands = machine.dispatch(Event::Stop);
    assert_eq!(commands, vec![Command::Cancel { generation }]);
    assert_eq!(machine.kind(), StateKind::Released);
    assert!(machine.is_empty());
    assert!(log.is_empty());

    assert!(machine.dispatch(Event::Start).is_empty());
    assert!(machine.dispatch(Event::Refresh { force: true }).is_empty());
    assert!(machine.dispatch(Event::LoadMore).is_empty());
    assert!(machine.deliver(generation, Ok(vec![1])).is_empty());
    assert_eq!(machine.kind(), StateKind::Released);
}

#[test]
fn test_completion_acts_on_current_state() {
    // First page in flight, a local insert moves the machine to LoadingNextPage;
    // the first-page result is appended after the inserted item.
    let (mut machine, _) = machine(5);
    let (generation, _) = fetched(&machine.dispatch(Event::Start)).unwrap();

    assert_eq!(machine.insert(100, None, |_| false), Some(0));
    assert_eq!(machine.kind(), StateKind::LoadingNextPage);

    machine.deliver(generation, Ok(vec![1, 2, 3, 4, 5]));
    assert_eq!(machine.items(), &[100, 1, 2, 3, 4, 5]);
    assert_eq!(machine.kind(), StateKind::HasMore);
}

#[test]
fn test_set_limit_applies_to_completion_check() {
    let (mut machine, _) = machine(5);
    let (generation, _) = fetched(&machine.dispatch(Event::Start)).unwrap();
    machine.set_limit(SINGLE_PAGE_LIMIT);
    machine.deliver(generation, Ok(vec![1, 2, 3, 4, 5]));
    assert_eq!(machine.kind(), StateKind::Complete);
    assert_eq!(machine.limit(), SINGLE_PAGE_LIMIT);
}

// ============================================================================
// Mutation Tests
// ============================================================================

#[test]
fn test_insert_positions_are_clamped() {
    let (mut machine, _) = loaded(5, vec![1, 2, 3]);

    assert_eq!(machine.insert(10, Some(0), |_| false), Some(0));
    assert_eq!(machine.insert(20, Some(99), |_| false), Some(4));
    assert_eq!(machine.insert(30, None, |_| false), Some(5));
    assert_eq!(machine.insert(40, Some(2), |_| false), Some(2));
    assert_eq!(machine.items(), &[10, 1, 40, 2, 3, 20, 30]);
}

#[test]
fn test_insert_duplicate_is_rejected() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3]);
    assert_eq!(machine.insert(2, None, |item| *item == 2), None);
    assert_eq!(machine.items(), &[1, 2, 3]);
    assert!(log.is_empty());
}

#[test]
fn test_insert_into_empty_shows_list() {
    let (mut machine, log) = loaded(5, vec![]);
    assert_eq!(machine.kind(), StateKind::Empty);

    assert_eq!(machine.insert(7, Some(3), |_| false), Some(0));
    assert_eq!(machine.kind(), StateKind::HasMore);
    assert_eq!(log.last_list(), Some(vec![7]));
}

#[test]
fn test_insert_after_load_failure_shows_list() {
    let (mut machine, _) = machine(5);
    machine.dispatch(Event::Start);
    machine.deliver(1, Err(Error::fetch("down")));

    machine.insert(1, None, |_| false);
    assert_eq!(machine.kind(), StateKind::HasMore);
}

#[test]
fn test_remove_first_returns_prior_index() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3, 2]);
    assert_eq!(machine.remove_first(|item| *item == 2), Some(1));
    assert_eq!(machine.items(), &[1, 3, 2]);
    assert_eq!(machine.remove_first(|item| *item == 42), None);
    assert_eq!(log.last_list(), Some(vec![1, 3, 2]));
}

#[test]
fn test_remove_all_that_empties_goes_empty() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3]);
    assert_eq!(machine.remove_all(|_| true), 3);
    assert_eq!(machine.kind(), StateKind::Empty);
    assert!(log.shown().contains(&Signal::EmptyView(true)));
}

#[test]
fn test_remove_all_during_next_page_falls_back_to_first_page() {
    let (mut machine, _) = loaded(5, vec![1, 2, 3, 4, 5]);
    machine.dispatch(Event::LoadMore);
    machine.remove_all(|_| true);
    assert_eq!(machine.kind(), StateKind::LoadingFirstPage);
    assert!(machine.pending().is_some());
}

#[test]
fn test_replace_first_updates_in_place() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3]);
    assert_eq!(machine.replace_first(20, |item| *item == 2), Some(1));
    assert_eq!(machine.items(), &[1, 20, 3]);
    assert_eq!(machine.kind(), StateKind::Complete);
    assert_eq!(log.signals(), vec![Signal::List(true, vec![1, 20, 3])]);

    assert_eq!(machine.replace_first(9, |item| *item == 99), None);
}

#[test]
fn test_mutations_ignored_before_start_and_after_release() {
    let (mut machine, _) = machine(5);
    assert_eq!(machine.insert(1, None, |_| false), None);
    assert!(machine.is_empty());

    machine.dispatch(Event::Stop);
    assert_eq!(machine.insert(1, None, |_| false), None);
    assert_eq!(machine.remove_all(|_| true), 0);
    assert_eq!(machine.replace_first(1, |_| true), None);
    assert!(machine.is_empty());
}

#[test]
fn test_invalidate_reshows_list() {
    let (mut machine, log) = loaded(5, vec![1, 2, 3, 4, 5]);
    machine.invalidate();
    assert_eq!(machine.kind(), StateKind::HasMore);
    assert_eq!(log.signals(), vec![Signal::List(true, vec![1, 2, 3, 4, 5])]);
}

#[test]
fn test_items_invariant_over_event_sequence() {
    let (mut machine, _) = machine(3);
    assert_items_invariant(&machine);

    let (g, _) = fetched(&machine.dispatch(Event::Start)).unwrap();
    assert_items_invariant(&machine);
    machine.deliver(g, Ok(vec![1, 2, 3]));
    assert_items_invariant(&machine);

    let (g, _) = fetched(&machine.dispatch(Event::LoadMore)).unwrap();
    assert_items_invariant(&machine);
    machine.remove_all(|item| *item < 3);
    assert_items_invariant(&machine);
    machine.deliver(g, Err(Error::fetch("flaky")));
    assert_items_invariant(&machine);

    let (g, _) = fetched(&machine.dispatch(Event::Refresh { force: false })).unwrap();
    machine.remove_all(|_| true);
    assert_items_invariant(&machine);
    machine.deliver(g, Ok(vec![]));
    assert_items_invariant(&machine);
    assert_eq!(machine.kind(), StateKind::Empty);

    machine.insert(4, None, |_| false);
    assert_items_invariant(&machine);
    machine.dispatch(Event::Stop);
    assert_items_invariant(&machine);
}

// ============================================================================
// Fault Isolation Tests
// ============================================================================

/// View whose every callback panics
struct PanickingView;

impl PageView<u32> for PanickingView {
    fn show_empty_loading(&self, _show: bool) {
        panic!("empty loading");
    }

    fn show_empty_error(&self, _show: bool, _error: Option<&Error>) {
        panic!("empty error");
    }

    fn show_empty_view(&self, _show: bool) {
        panic!("empty view");
    }

    fn show_list(&self, _show: bool, _items: &[u32]) {
        panic!("list");
    }

    fn show_error_toast(&self, _error: &Error) {
        panic!("toast");
    }

    fn show_refresh_spinner(&self, _show: bool) {
        panic!("refresh spinner");
    }

    fn show_page_spinner(&self, _show: bool) {
        panic!("page spinner");
    }
}

#[test]
fn test_panicking_view_does_not_interrupt_transitions() {
    let mut machine = Machine::<u32>::new(Arc::new(PanickingView), 2);

    let commands = machine.dispatch(Event::Start);
    let (generation, kind) = fetched(&commands).unwrap();
    assert_eq!(kind, FetchKind::FirstPage);
    assert_eq!(machine.kind(), StateKind::LoadingFirstPage);
    assert_eq!(machine.pending(), Some(generation));

    machine.deliver(generation, Ok(vec![1, 2]));
    assert_eq!(machine.kind(), StateKind::HasMore);
    assert_eq!(machine.pending(), None);

    let (generation, kind) = fetched(&machine.dispatch(Event::LoadMore)).unwrap();
    assert_eq!(kind, FetchKind::NextPage);
    machine.deliver(generation, Err(Error::fetch("flaky")));
    assert_eq!(machine.kind(), StateKind::HasMore);

    assert_eq!(machine.replace_first(9, |item| *item == 1), Some(0));
    assert_eq!(machine.items(), &[9, 2]);
    assert_items_invariant(&machine);
}
