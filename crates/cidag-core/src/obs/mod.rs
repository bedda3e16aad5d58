//! Observability: runtime counters and the sink abstraction.
//!
//! Query, match and render code never touches counters directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub mod sink;

pub use metrics::{EventOps, EventReport, TypeCounters};
pub use sink::{
    MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, record, with_metrics_sink,
};
