use std::{cell::RefCell, collections::BTreeMap};

thread_local! {
    static STATE: RefCell<MetricsState> = RefCell::new(MetricsState::default());
}

///
/// MetricsState
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetricsState {
    pub ops: OpCounters,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// OpCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OpCounters {
    pub load_calls: u64,
    pub insert_calls: u64,
    pub rows_loaded: u64,
    pub rows_inserted: u64,
    pub commits: u64,
    pub rollbacks: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntityCounters {
    pub load_calls: u64,
    pub insert_calls: u64,
    pub rows_loaded: u64,
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut MetricsState) -> R) -> R {
    STATE.with(|s| f(&mut s.borrow_mut()))
}

/// Copy of the current thread's counters.
#[must_use]
pub fn snapshot() -> MetricsState {
    STATE.with(|s| s.borrow().clone())
}

pub fn reset() {
    STATE.with(|s| *s.borrow_mut() = MetricsState::default());
}
