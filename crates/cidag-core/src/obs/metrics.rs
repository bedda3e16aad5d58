use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for one thread of execution.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Store
    pub batches_loaded: u64,
    pub batches_rejected: u64,
    pub objects_loaded: u64,

    // Query
    pub queries: u64,
    pub objects_reached: u64,
    pub edges_traversed: u64,
    pub unresolved_parents: u64,

    // Monitor
    pub rules_evaluated: u64,
    pub rules_matched: u64,
    pub rules_skipped: u64,
    pub messages_rendered: u64,
    pub render_failures: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TypeCounters {
    pub objects_loaded: u64,
    pub unresolved_parents: u64,
    pub rules_matched: u64,
    pub rules_skipped: u64,
}

///
/// EventReport
/// Point-in-time snapshot of the counters.
///

pub type EventReport = EventState;

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Bump one per-type counter.
pub(crate) fn with_type_mut(
    state: &mut EventState,
    type_name: &str,
    f: impl FnOnce(&mut TypeCounters),
) {
    f(state.types.entry(type_name.to_string()).or_default());
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}
