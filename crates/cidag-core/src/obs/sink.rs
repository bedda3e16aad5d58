//! Metrics sink boundary.
//!
//! This module is the only bridge between execution logic and the
//! thread-local counter state.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    BatchLoaded {
        objects: u64,
    },
    BatchRejected,
    ObjectLoaded {
        type_name: &'a str,
    },
    QueryExecuted {
        hops: u64,
        objects_reached: u64,
        edges_traversed: u64,
    },
    UnresolvedParent {
        type_name: &'a str,
    },
    RuleEvaluated {
        type_name: &'a str,
        matched: bool,
    },
    RuleSkipped {
        type_name: &'a str,
    },
    MessageRendered,
    RenderFailed,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counter state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::BatchLoaded { objects } => {
                m.ops.batches_loaded = m.ops.batches_loaded.saturating_add(1);
                m.ops.objects_loaded = m.ops.objects_loaded.saturating_add(objects);
            }
            MetricsEvent::BatchRejected => {
                m.ops.batches_rejected = m.ops.batches_rejected.saturating_add(1);
            }
            MetricsEvent::ObjectLoaded { type_name } => {
                metrics::with_type_mut(m, type_name, |t| {
                    t.objects_loaded = t.objects_loaded.saturating_add(1);
                });
            }
            MetricsEvent::QueryExecuted {
                hops: _,
                objects_reached,
                edges_traversed,
            } => {
                m.ops.queries = m.ops.queries.saturating_add(1);
                m.ops.objects_reached = m.ops.objects_reached.saturating_add(objects_reached);
                m.ops.edges_traversed = m.ops.edges_traversed.saturating_add(edges_traversed);
            }
            MetricsEvent::UnresolvedParent { type_name } => {
                m.ops.unresolved_parents = m.ops.unresolved_parents.saturating_add(1);
                metrics::with_type_mut(m, type_name, |t| {
                    t.unresolved_parents = t.unresolved_parents.saturating_add(1);
                });
            }
            MetricsEvent::RuleEvaluated { type_name, matched } => {
                m.ops.rules_evaluated = m.ops.rules_evaluated.saturating_add(1);
                if matched {
                    m.ops.rules_matched = m.ops.rules_matched.saturating_add(1);
                    metrics::with_type_mut(m, type_name, |t| {
                        t.rules_matched = t.rules_matched.saturating_add(1);
                    });
                }
            }
            MetricsEvent::RuleSkipped { type_name } => {
                m.ops.rules_skipped = m.ops.rules_skipped.saturating_add(1);
                metrics::with_type_mut(m, type_name, |t| {
                    t.rules_skipped = t.rules_skipped.saturating_add(1);
                });
            }
            MetricsEvent::MessageRendered => {
                m.ops.messages_rendered = m.ops.messages_rendered.saturating_add(1);
            }
            MetricsEvent::RenderFailed => {
                m.ops.render_failures = m.ops.render_failures.saturating_add(1);
            }
        });
    }
}

/// Route one event to the scoped override, or the global sink.
pub fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current counter state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all counter state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit path, including unwind.
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
