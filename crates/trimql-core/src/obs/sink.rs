//! Metrics sink boundary.
//!
//! Projection logic never touches `obs::metrics` directly; all
//! instrumentation flows through [`MetricsEvent`] and [`MetricsSink`].
use crate::obs::metrics::{self, bump};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ShapeKind
/// Source shape a projection was attached to, or a reduction consumed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShapeKind {
    Deferred,
    Sequence,
    Stream,
    Page,
}

///
/// ReduceKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReduceKind {
    Single,
    First,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    TreeBuilt {
        root: &'a str,
        nodes: u64,
        dropped: u64,
    },
    ProjectionAttached {
        root: &'a str,
        shape: ShapeKind,
    },
    ElementsProjected {
        kept: u64,
        filtered_out: u64,
    },
    Reduced {
        kind: ReduceKind,
        shape: ShapeKind,
    },
    SingleViolation,
    CacheLookup {
        hit: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::TreeBuilt {
                root,
                nodes,
                dropped,
            } => {
                metrics::with_state_mut(|m| {
                    bump(&mut m.ops.trees_built, 1);
                    bump(&mut m.ops.tree_nodes, nodes);
                    bump(&mut m.ops.lists_dropped, dropped);

                    let entry = m.roots.entry(root.to_string()).or_default();
                    bump(&mut entry.trees_built, 1);
                    bump(&mut entry.tree_nodes, nodes);
                });
            }

            MetricsEvent::ProjectionAttached { root, shape } => {
                metrics::with_state_mut(|m| {
                    let counter = match shape {
                        ShapeKind::Deferred => &mut m.ops.projected_deferred,
                        ShapeKind::Sequence => &mut m.ops.projected_sequence,
                        ShapeKind::Stream => &mut m.ops.projected_stream,
                        ShapeKind::Page => &mut m.ops.projected_page,
                    };
                    bump(counter, 1);

                    let entry = m.roots.entry(root.to_string()).or_default();
                    bump(&mut entry.projections, 1);
                });
            }

            MetricsEvent::ElementsProjected { kept, filtered_out } => {
                metrics::with_state_mut(|m| {
                    bump(&mut m.ops.elements_projected, kept);
                    bump(&mut m.ops.elements_filtered_out, filtered_out);
                });
            }

            MetricsEvent::Reduced { kind, .. } => {
                metrics::with_state_mut(|m| match kind {
                    ReduceKind::Single => bump(&mut m.ops.reductions_single, 1),
                    ReduceKind::First => bump(&mut m.ops.reductions_first, 1),
                });
            }

            MetricsEvent::SingleViolation => {
                metrics::with_state_mut(|m| bump(&mut m.ops.single_violations, 1));
            }

            MetricsEvent::CacheLookup { hit } => {
                metrics::with_state_mut(|m| {
                    if hit {
                        bump(&mut m.ops.cache_hits, 1);
                    } else {
                        bump(&mut m.ops.cache_misses, 1);
                    }
                });
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingSink {
        events: Cell<u32>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _event: MetricsEvent<'_>) {
            self.events.set(self.events.get() + 1);
        }
    }

    #[test]
    fn override_captures_events_and_restores() {
        metrics_reset_all();
        let sink = Rc::new(CountingSink::default());

        with_metrics_sink(sink.clone(), || {
            record(MetricsEvent::SingleViolation);
            record(MetricsEvent::CacheLookup { hit: true });
        });
        assert_eq!(sink.events.get(), 2);
        assert_eq!(metrics_report().counters.ops.single_violations, 0);

        record(MetricsEvent::SingleViolation);
        assert_eq!(metrics_report().counters.ops.single_violations, 1);

        metrics_reset_all();
    }

    #[test]
    fn override_is_restored_after_panic() {
        let sink = Rc::new(CountingSink::default());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || panic!("boom"));
        }));
        assert!(result.is_err());

        assert!(SINK_OVERRIDE.with(|cell| cell.borrow().is_none()));
    }

    #[test]
    fn global_sink_tracks_roots() {
        metrics_reset_all();

        record(MetricsEvent::TreeBuilt {
            root: "Person",
            nodes: 4,
            dropped: 1,
        });
        record(MetricsEvent::ProjectionAttached {
            root: "Person",
            shape: ShapeKind::Deferred,
        });

        let report = metrics_report();
        assert_eq!(report.counters.ops.tree_nodes, 4);
        assert_eq!(report.counters.ops.lists_dropped, 1);
        assert_eq!(report.counters.ops.projected_deferred, 1);
        assert_eq!(report.root_summaries[0].root, "Person");
        assert_eq!(report.root_summaries[0].projections, 1);

        metrics_reset_all();
    }
}
