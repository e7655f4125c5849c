use crate::{
    catalog::Catalog,
    config::SessionConfig,
    db::{
        Record,
        executor::{Connection, Transaction},
        query::{CriteriaBuilder, CriteriaQuery},
    },
    error::InternalError,
    obs::sink::{GlobalMetricsSink, MetricsEvent, MetricsSink},
    traits::Entity,
};
use std::sync::Arc;

///
/// Session
///
/// Session-scoped database handle: one connection, the shared catalog, and
/// policy (config, metrics). All statements run inside a [`Transaction`].
///

pub struct Session<C: Connection> {
    pub(super) conn: C,
    pub(super) catalog: Arc<Catalog>,
    pub(super) config: SessionConfig,
    metrics: Option<&'static dyn MetricsSink>,
}

impl<C: Connection> Session<C> {
    #[must_use]
    pub fn new(conn: C, catalog: Arc<Catalog>) -> Self {
        Self {
            conn,
            catalog,
            config: SessionConfig::default(),
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Route metrics to `sink` instead of the thread-local global sink.
    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub fn criteria(&self) -> CriteriaBuilder<'_> {
        CriteriaBuilder::new(&self.catalog)
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn begin(&mut self) -> Result<Transaction<'_, C>, InternalError> {
        Transaction::begin(self)
    }

    // ---------------------------------------------------------------------
    // One-shot entry points (own transaction)
    // ---------------------------------------------------------------------

    pub fn load<E: Entity>(&mut self, query: &CriteriaQuery) -> Result<Vec<E>, InternalError> {
        let mut tx = self.begin()?;
        let entities = tx.load(query)?;
        tx.commit()?;

        Ok(entities)
    }

    pub fn load_records(&mut self, query: &CriteriaQuery) -> Result<Vec<Record>, InternalError> {
        let mut tx = self.begin()?;
        let records = tx.load_records(query)?;
        tx.commit()?;

        Ok(records)
    }

    pub(super) fn record(&self, event: MetricsEvent<'_>) {
        match self.metrics {
            Some(sink) => sink.record(event),
            None => GlobalMetricsSink.record(event),
        }
    }
}

#[cfg(feature = "sqlite")]
impl Session<crate::db::executor::SqliteConnection> {
    /// Open a SQLite-backed session as described by `config`.
    pub fn open(config: SessionConfig, catalog: Arc<Catalog>) -> Result<Self, InternalError> {
        let conn = crate::db::executor::SqliteConnection::open_with(&config)?;
        tracing::info!(
            unit = %config.unit,
            path = ?config.database.path,
            entities = catalog.entity_names().count(),
            "session opened"
        );

        Ok(Self::new(conn, catalog).with_config(config))
    }

    /// Run caller-owned DDL on the underlying connection.
    pub fn execute_batch(&self, sql: &str) -> Result<(), InternalError> {
        self.conn.execute_batch(sql)?;

        Ok(())
    }
}
