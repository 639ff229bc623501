use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for projection activity.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub roots: BTreeMap<String, RootCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Selection walking
    pub trees_built: u64,
    pub tree_nodes: u64,
    pub lists_dropped: u64,

    // Projection attachment, by source shape
    pub projected_deferred: u64,
    pub projected_sequence: u64,
    pub projected_stream: u64,
    pub projected_page: u64,

    // Nested list elements
    pub elements_projected: u64,
    pub elements_filtered_out: u64,

    // Cardinality reduction
    pub reductions_single: u64,
    pub reductions_first: u64,
    pub single_violations: u64,

    // Compiled projection cache
    pub cache_hits: u64,
    pub cache_misses: u64,
}

///
/// RootCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RootCounters {
    pub trees_built: u64,
    pub tree_nodes: u64,
    pub projections: u64,
}

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

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Increment a counter by `by`, saturating.
pub(crate) const fn bump(counter: &mut u64, by: u64) {
    *counter = counter.saturating_add(by);
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub root_summaries: Vec<RootSummary>,
}

///
/// RootSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RootSummary {
    pub root: String,
    pub trees_built: u64,
    pub projections: u64,
    pub avg_nodes_per_tree: f64,
}

/// Snapshot the current state with per-root averages.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let root_summaries = snap
        .roots
        .iter()
        .map(|(root, counters)| {
            let avg_nodes_per_tree = if counters.trees_built > 0 {
                counters.tree_nodes as f64 / counters.trees_built as f64
            } else {
                0.0
            };

            RootSummary {
                root: root.clone(),
                trees_built: counters.trees_built,
                projections: counters.projections,
                avg_nodes_per_tree,
            }
        })
        .collect();

    EventReport {
        counters: snap,
        root_summaries,
    }
}

///
/// TESTS
///
