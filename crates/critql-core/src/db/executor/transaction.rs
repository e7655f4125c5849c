use crate::{
    db::{
        Record,
        executor::{Connection, Session, mapping},
        query::{Bindings, CompareOp, CriteriaBuilder, CriteriaQuery, JoinKind, QueryError},
        sql::{self, TranslatedQuery},
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{ExecKind, MetricsEvent},
    traits::Entity,
    value::Value,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

///
/// TxState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

impl TxState {
    const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        }
    }
}

///
/// Transaction
///
/// Guard over one database transaction on a [`Session`].
///
/// - Any failing operation rolls back before its error is returned.
/// - Once committed or rolled back, every operation fails.
/// - Dropping an active guard rolls back.
///

pub struct Transaction<'s, C: Connection> {
    session: &'s mut Session<C>,
    state: TxState,
}

impl<'s, C: Connection> Transaction<'s, C> {
    pub(super) fn begin(session: &'s mut Session<C>) -> Result<Self, InternalError> {
        session.conn.begin()?;
        debug!(unit = %session.config.unit, "transaction started");

        Ok(Self {
            session,
            state: TxState::Active,
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TxState::Active
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Insert `entity` and assign its generated identity.
    pub fn persist<E: Entity>(&mut self, entity: &mut E) -> Result<Value, InternalError> {
        self.guard(|tx| tx.persist_inner(entity))
    }

    fn persist_inner<E: Entity>(&mut self, entity: &mut E) -> Result<Value, InternalError> {
        let descriptor = self.session.catalog.describe(E::ENTITY_NAME)?;
        self.session.record(MetricsEvent::ExecStart {
            kind: ExecKind::Insert,
            entity: descriptor.name(),
        });

        let provided = entity.values()?;
        for (name, _) in &provided {
            if descriptor.member(name).is_none() {
                return Err(QueryError::UnknownField {
                    entity: descriptor.name().to_string(),
                    field: (*name).to_string(),
                }
                .into());
            }
        }

        let mut columns = Vec::new();
        let mut values = Vec::new();
        for member in descriptor.members() {
            let value = provided
                .iter()
                .find(|(name, _)| *name == member.name())
                .map(|(_, value)| value);
            let is_null = value.is_none_or(Value::is_null);
            if member.is_generated() && is_null {
                continue;
            }
            if is_null && !member.is_nullable() {
                return Err(InternalError::executor_invalid_input(format!(
                    "'{}.{}' is required but has no value",
                    descriptor.name(),
                    member.name()
                )));
            }

            if let Some(value) = value {
                columns.push(member.column());
                values.push(value.to_storage()?);
            }
        }

        let sql = sql::translate_insert(&descriptor, &columns);
        self.log_statement(&sql, values.len());
        let key = self.session.conn.insert(&sql, &values)?;

        let id = match entity.id() {
            Some(id) => id,
            None => {
                entity.set_id(key.clone())?;
                key
            }
        };

        self.session.record(MetricsEvent::ExecFinish {
            kind: ExecKind::Insert,
            entity: descriptor.name(),
            rows: 1,
        });

        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Load one entity by primary key, with each relation outer-joined one
    /// level deep.
    pub fn find<E: Entity>(&mut self, id: impl Into<Value>) -> Result<Option<E>, InternalError> {
        let id = id.into();
        self.guard(|tx| {
            let query = tx.find_query(E::ENTITY_NAME, id)?;
            let translated = sql::translate(&query)?;
            let records = tx.execute_inner(&translated, query.bindings())?;

            records.first().map(E::from_record).transpose()
        })
    }

    fn find_query(&self, entity: &str, id: Value) -> Result<CriteriaQuery, QueryError> {
        let catalog = Arc::clone(&self.session.catalog);
        let cb = CriteriaBuilder::new(&catalog);
        let mut query = cb.new_query(entity)?;
        let root = query.root();

        let relations: Vec<String> = query
            .entity()
            .relations()
            .iter()
            .map(|r| r.name.clone())
            .collect();
        for relation in &relations {
            cb.join(&mut query, root, relation, JoinKind::LeftOuter)?;
        }

        let key = query.entity().primary_key().name.clone();
        let param = cb.declare_scalar_parameter(&mut query);
        cb.where_compare(&mut query, root, &key, CompareOp::Eq, param)?;
        query.bind(param, [id])?;

        Ok(query)
    }

    /// Translate, execute, and map `query` into `E`.
    pub fn load<E: Entity>(&mut self, query: &CriteriaQuery) -> Result<Vec<E>, InternalError> {
        self.guard(|tx| {
            let found = query.entity().name();
            if found != E::ENTITY_NAME {
                return Err(InternalError::entity_mismatch(E::ENTITY_NAME, found));
            }

            let translated = sql::translate(query)?;
            let records = tx.execute_inner(&translated, query.bindings())?;

            records.iter().map(E::from_record).collect()
        })
    }

    /// Translate and execute `query`, returning dynamic records.
    pub fn load_records(&mut self, query: &CriteriaQuery) -> Result<Vec<Record>, InternalError> {
        self.guard(|tx| {
            let translated = sql::translate(query)?;

            tx.execute_inner(&translated, query.bindings())
        })
    }

    /// Execute a translated query against explicit bindings.
    pub fn execute(
        &mut self,
        query: &TranslatedQuery,
        bindings: &Bindings,
    ) -> Result<Vec<Record>, InternalError> {
        self.guard(|tx| tx.execute_inner(query, bindings))
    }

    fn execute_inner(
        &mut self,
        query: &TranslatedQuery,
        bindings: &Bindings,
    ) -> Result<Vec<Record>, InternalError> {
        let entity = query.entity().name();
        self.session.record(MetricsEvent::ExecStart {
            kind: ExecKind::Load,
            entity,
        });

        let values = expand_bindings(query, bindings)?;
        self.log_statement(query.sql(), values.len());
        let rows = self.session.conn.query(query.sql(), &values)?;

        if let Some(max) = self.session.config.max_rows.filter(|max| rows.len() > *max) {
            return Err(InternalError::new(
                ErrorClass::Conflict,
                ErrorOrigin::Executor,
                format!("query on '{entity}' returned {} rows, limit is {max}", rows.len()),
            ));
        }

        let records = mapping::map_rows(query.layout(), &rows)?;
        self.session.record(MetricsEvent::ExecFinish {
            kind: ExecKind::Load,
            entity,
            rows: u64::try_from(records.len()).unwrap_or(u64::MAX),
        });

        Ok(records)
    }

    // ---------------------------------------------------------------------
    // Completion
    // ---------------------------------------------------------------------

    pub fn commit(mut self) -> Result<(), InternalError> {
        self.ensure_active()?;

        match self.session.conn.commit() {
            Ok(()) => {
                self.state = TxState::Committed;
                self.session.record(MetricsEvent::Commit);
                debug!(unit = %self.session.config.unit, "transaction committed");

                Ok(())
            }
            Err(err) => {
                let err = InternalError::from(err);
                self.rollback_after_failure(&err);

                Err(err)
            }
        }
    }

    pub fn rollback(mut self) -> Result<(), InternalError> {
        self.ensure_active()?;
        self.state = TxState::RolledBack;
        self.session.record(MetricsEvent::Rollback);
        self.session.conn.rollback()?;
        debug!(unit = %self.session.config.unit, "transaction rolled back");

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), InternalError> {
        match self.state {
            TxState::Active => Ok(()),
            state => Err(InternalError::transaction_closed(state.label())),
        }
    }

    // Run `op`, rolling back on failure.
    fn guard<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        self.ensure_active()?;

        op(self).inspect_err(|err| self.rollback_after_failure(err))
    }

    fn rollback_after_failure(&mut self, cause: &InternalError) {
        self.state = TxState::RolledBack;
        self.session.record(MetricsEvent::Rollback);

        match self.session.conn.rollback() {
            Ok(()) => debug!(cause = %cause, "transaction rolled back after failure"),
            Err(err) => warn!(cause = %cause, error = %err, "rollback after failure did not complete"),
        }
    }

    fn log_statement(&self, sql: &str, values: usize) {
        if self.session.config.debug {
            info!(unit = %self.session.config.unit, sql, values, "executing statement");
        } else {
            debug!(sql, values, "executing statement");
        }
    }
}

impl<C: Connection> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if self.state != TxState::Active {
            return;
        }

        self.state = TxState::RolledBack;
        self.session.record(MetricsEvent::Rollback);
        if let Err(err) = self.session.conn.rollback() {
            warn!(error = %err, "rollback of dropped transaction did not complete");
        }
    }
}

/// Flatten bindings into positional values in placeholder order.
fn expand_bindings(query: &TranslatedQuery, bindings: &Bindings) -> Result<Vec<Value>, InternalError> {
    let mut values = Vec::with_capacity(query.placeholder_count());

    for slot in query.parameter_order() {
        let bound = bindings
            .get(slot.parameter)
            .ok_or_else(|| QueryError::UnboundParameter {
                parameter: slot.label.clone(),
            })?;
        if bound.len() != slot.placeholders {
            return Err(QueryError::ParameterArityMismatch {
                parameter: slot.label.clone(),
                expected: slot.placeholders,
                found: bound.len(),
            }
            .into());
        }

        for value in bound {
            values.push(value.to_storage()?);
        }
    }

    let placeholders = sql::count_placeholders(query.sql());
    if values.len() != placeholders {
        return Err(QueryError::ParameterArityMismatch {
            parameter: "statement".to_string(),
            expected: placeholders,
            found: values.len(),
        }
        .into());
    }

    Ok(values)
}
