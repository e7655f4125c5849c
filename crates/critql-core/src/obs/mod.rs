//! Observability: metrics events, sinks, and the thread-local counters.
//!
//! Executor code never touches `metrics` state directly; every event flows
//! through [`sink::MetricsSink`].
pub mod metrics;
pub mod sink;
