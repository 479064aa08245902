//! Transition table
//!
//! `transition` is a pure function of the current state, the event and a
//! small context. Events a state does not list are no-ops.

use super::types::{Context, Effect, Event, FetchKind, ItemOp, State, Transition};
use crate::error::SharedError;
use crate::types::is_last_page;

/// Compute the transition for `event` in `state`.
pub fn transition<T>(state: &State, event: Event<T>, ctx: Context) -> Transition<T> {
    if state.is_released() {
        return Transition::stay();
    }

    match event {
        Event::Start => on_start(state),
        Event::Refresh { force } => on_refresh(state, force),
        Event::LoadMore => on_load_more(state),
        Event::Stop => Transition::to(State::Released)
            .items(ItemOp::Clear)
            .effect(Effect::CancelFetch),
        Event::DataArrived(batch) => on_data(state, batch, ctx),
        Event::FetchFailed(error) => on_failure(state, error, ctx),
        Event::Reconcile => on_reconcile(state, ctx),
    }
}

fn first_page<T>() -> Transition<T> {
    Transition::to(State::LoadingFirstPage).effect(Effect::IssueFetch(FetchKind::FirstPage))
}

fn refreshing<T>() -> Transition<T> {
    Transition::to(State::Refreshing).effect(Effect::IssueFetch(FetchKind::FirstPage))
}

fn on_start<T>(state: &State) -> Transition<T> {
    match state {
        State::LoadingFirstPage => {
            Transition::stay().effect(Effect::IssueFetch(FetchKind::FirstPage))
        }
        State::Empty => first_page(),
        State::Idle
        | State::LoadFailed(_)
        | State::HasMore
        | State::Refreshing
        | State::LoadingNextPage
        | State::Complete => first_page().items(ItemOp::Clear),
        State::Released => Transition::stay(),
    }
}

fn on_refresh<T>(state: &State, force: bool) -> Transition<T> {
    match state {
        State::Idle | State::LoadFailed(_) | State::Empty => first_page(),
        State::HasMore | State::LoadingNextPage | State::Complete => refreshing(),
        State::Refreshing if force => refreshing(),
        State::Refreshing | State::LoadingFirstPage | State::Released => Transition::stay(),
    }
}

fn on_load_more<T>(state: &State) -> Transition<T> {
    match state {
        State::HasMore => Transition::to(State::LoadingNextPage)
            .effect(Effect::IssueFetch(FetchKind::NextPage)),
        _ => Transition::stay(),
    }
}

fn on_data<T>(state: &State, batch: Vec<T>, ctx: Context) -> Transition<T> {
    match state {
        State::LoadingFirstPage | State::Refreshing => {
            if batch.is_empty() {
                return Transition::to(State::Empty).items(ItemOp::Clear);
            }
            let next = if is_last_page(ctx.limit, batch.len()) {
                State::Complete
            } else {
                State::HasMore
            };
            Transition::to(next).items(ItemOp::Replace(batch))
        }
        State::LoadingNextPage => {
            let next = if batch.is_empty() || is_last_page(ctx.limit, batch.len()) {
                State::Complete
            } else {
                State::HasMore
            };
            Transition::to(next).items(ItemOp::Append(batch))
        }
        _ => Transition::stay(),
    }
}

fn on_failure<T>(state: &State, error: SharedError, ctx: Context) -> Transition<T> {
    match state {
        State::LoadingFirstPage => Transition::to(State::LoadFailed(error)),
        State::Refreshing => {
            Transition::to(State::HasMore).effect(Effect::ShowErrorToast(error))
        }
        State::LoadingNextPage => {
            let next = if ctx.has_items {
                State::HasMore
            } else {
                State::Empty
            };
            Transition::to(next).effect(Effect::ShowErrorToast(error))
        }
        _ => Transition::stay(),
    }
}

fn on_reconcile<T>(state: &State, ctx: Context) -> Transition<T> {
    match state {
        State::LoadingFirstPage if ctx.has_items => Transition::to(State::LoadingNextPage),
        State::LoadFailed(_) | State::Empty if ctx.has_items => Transition::to(State::HasMore),
        State::HasMore | State::Complete => {
            if ctx.has_items {
                Transition::stay().effect(Effect::ShowList)
            } else {
                Transition::to(State::Empty)
            }
        }
        State::Refreshing | State::LoadingNextPage => {
            if ctx.has_items {
                Transition::stay().effect(Effect::ShowList)
            } else {
                Transition::to(State::LoadingFirstPage)
            }
        }
        _ => Transition::stay(),
    }
}
