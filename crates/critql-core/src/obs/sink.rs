//! Metrics sink boundary.
//!
//! Sessions report through an explicitly installed sink, or the global
//! thread-local sink when none is installed.
use crate::obs::metrics;

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Insert,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        entity: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        entity: &'a str,
        rows: u64,
    },
    Commit,
    Rollback,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
///

pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::ExecStart { kind, entity } => {
                let entry = m.entities.entry(entity.to_string()).or_default();
                match kind {
                    ExecKind::Load => {
                        m.ops.load_calls = m.ops.load_calls.saturating_add(1);
                        entry.load_calls = entry.load_calls.saturating_add(1);
                    }
                    ExecKind::Insert => {
                        m.ops.insert_calls = m.ops.insert_calls.saturating_add(1);
                        entry.insert_calls = entry.insert_calls.saturating_add(1);
                    }
                }
            }
            MetricsEvent::ExecFinish { kind, entity, rows } => {
                let entry = m.entities.entry(entity.to_string()).or_default();
                match kind {
                    ExecKind::Load => {
                        m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows);
                        entry.rows_loaded = entry.rows_loaded.saturating_add(rows);
                    }
                    ExecKind::Insert => {
                        m.ops.rows_inserted = m.ops.rows_inserted.saturating_add(rows);
                    }
                }
            }
            MetricsEvent::Commit => m.ops.commits = m.ops.commits.saturating_add(1),
            MetricsEvent::Rollback => m.ops.rollbacks = m.ops.rollbacks.saturating_add(1),
        });
    }
}
