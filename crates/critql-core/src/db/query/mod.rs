//! Module: db::query
//! Responsibility: the criteria expression tree and its builder.
//! Does not own: SQL rendering (`db::sql`) or execution (`db::executor`).
//! Boundary: every alias, member, and parameter is validated when it enters
//! the tree, so translation only re-checks structural invariants.

mod builder;
mod error;
mod param;
mod predicate;

#[cfg(test)]
mod tests;

use crate::{model::EntityDescriptor, value::Value};
use derive_more::Display;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

// re-exports
pub use builder::CriteriaBuilder;
pub use error::QueryError;
pub use param::{Arity, Bindings, Parameter, ParameterHandle};
pub use predicate::{CompareOp, FieldPath, Predicate};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);

///
/// QueryId
///
/// Process-unique tag stamped on every alias and parameter handle so handles
/// from one query cannot be used on another.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryId(u64);

impl QueryId {
    fn next() -> Self {
        Self(NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

///
/// Alias
///
/// Table reference within one query tree; `t0` is always the root.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("t{index}")]
pub struct Alias {
    query: QueryId,
    index: usize,
}

impl Alias {
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn is_root(self) -> bool {
        self.index == 0
    }
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum JoinKind {
    #[display("JOIN")]
    Inner,
    #[display("LEFT OUTER JOIN")]
    LeftOuter,
}

///
/// JoinClause
///
/// Declared join; `kind` is carried verbatim into the generated SQL.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinClause {
    pub source: Alias,
    pub relation: String,
    pub target: Alias,
    pub kind: JoinKind,
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    #[display("ASC")]
    Asc,
    #[display("DESC")]
    Desc,
}

///
/// OrderClause
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderClause {
    pub path: FieldPath,
    pub direction: OrderDirection,
}

///
/// PageSpec
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSpec {
    pub limit: u32,
    pub offset: u32,
}

///
/// CriteriaQuery
///
/// Expression tree for one load query: root entity, joins, predicates,
/// ordering, parameters, their bindings, and an optional page window.
/// Built through [`CriteriaBuilder`]; bound through [`CriteriaQuery::bind`].
///

#[derive(Clone, Debug)]
pub struct CriteriaQuery {
    id: QueryId,
    aliases: Vec<Arc<EntityDescriptor>>,
    joins: Vec<JoinClause>,
    predicates: Vec<Predicate>,
    order: Vec<OrderClause>,
    parameters: Vec<Parameter>,
    bindings: Bindings,
    page: Option<PageSpec>,
}

impl CriteriaQuery {
    pub(crate) fn new(root: Arc<EntityDescriptor>) -> Self {
        Self {
            id: QueryId::next(),
            aliases: vec![root],
            joins: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
            parameters: Vec::new(),
            bindings: Bindings::default(),
            page: None,
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn root(&self) -> Alias {
        Alias {
            query: self.id,
            index: 0,
        }
    }

    /// Root entity descriptor.
    #[must_use]
    pub fn entity(&self) -> &Arc<EntityDescriptor> {
        &self.aliases[0]
    }

    /// Entity bound to `alias`.
    pub fn alias_entity(&self, alias: Alias) -> Result<&Arc<EntityDescriptor>, QueryError> {
        if alias.query != self.id {
            return Err(QueryError::UnknownAlias {
                alias: alias.to_string(),
            });
        }

        self.aliases
            .get(alias.index)
            .ok_or_else(|| QueryError::UnknownAlias {
                alias: alias.to_string(),
            })
    }

    /// Every declared alias, root first.
    pub fn aliases(&self) -> impl Iterator<Item = (Alias, &Arc<EntityDescriptor>)> {
        let query = self.id;
        self.aliases
            .iter()
            .enumerate()
            .map(move |(index, entity)| (Alias { query, index }, entity))
    }

    #[must_use]
    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub fn order(&self) -> &[OrderClause] {
        &self.order
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    #[must_use]
    pub const fn page(&self) -> Option<PageSpec> {
        self.page
    }

    /// Resolve a member path through `alias`.
    ///
    /// Mirrors a read-only path access such as `root.get("manager")`: it
    /// validates the member and never touches the join list.
    pub fn path(&self, alias: Alias, member: &str) -> Result<FieldPath, QueryError> {
        let entity = self.alias_entity(alias)?;
        let resolved = entity
            .member(member)
            .ok_or_else(|| QueryError::UnknownField {
                entity: entity.name().to_string(),
                field: member.to_string(),
            })?;

        Ok(FieldPath {
            alias,
            member: member.to_string(),
            column: resolved.column().to_string(),
            relation: resolved.is_relation(),
        })
    }

    pub fn parameter(&self, handle: ParameterHandle) -> Result<&Parameter, QueryError> {
        if handle.query != self.id {
            return Err(QueryError::UnknownParameter {
                parameter: handle.label(),
            });
        }

        self.parameters
            .get(handle.index)
            .ok_or_else(|| QueryError::UnknownParameter {
                parameter: handle.label(),
            })
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Bind values to a parameter, replacing any earlier binding.
    pub fn bind<I, V>(&mut self, handle: ParameterHandle, values: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let parameter = self.parameter(handle)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();

        if parameter.arity == Arity::Single && values.len() != 1 {
            return Err(QueryError::ParameterArityMismatch {
                parameter: parameter.label(),
                expected: 1,
                found: values.len(),
            });
        }

        self.bindings.bind(handle, values);

        Ok(())
    }

    /// Bind a named parameter.
    pub fn bind_named<I, V>(&mut self, name: &str, values: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let handle = self
            .parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .map(|p| p.handle)
            .ok_or_else(|| QueryError::UnknownParameter {
                parameter: format!(":{name}"),
            })?;

        self.bind(handle, values)
    }

    /// Whether every declared parameter has a binding.
    #[must_use]
    pub fn is_fully_bound(&self) -> bool {
        self.parameters
            .iter()
            .all(|p| self.bindings.contains(p.handle))
    }

    // ------------------------------------------------------------------
    // Tree construction (builder-facing)
    // ------------------------------------------------------------------

    pub(crate) fn push_alias(&mut self, entity: Arc<EntityDescriptor>) -> Alias {
        self.aliases.push(entity);

        Alias {
            query: self.id,
            index: self.aliases.len() - 1,
        }
    }

    pub(crate) fn push_join(&mut self, join: JoinClause) {
        self.joins.push(join);
    }

    pub(crate) fn push_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub(crate) fn push_order(&mut self, clause: OrderClause) {
        self.order.push(clause);
    }

    pub(crate) fn push_parameter(&mut self, name: Option<String>, arity: Arity) -> ParameterHandle {
        let handle = ParameterHandle {
            query: self.id,
            index: self.parameters.len(),
        };
        self.parameters.push(Parameter {
            handle,
            name,
            arity,
        });

        handle
    }

    pub(crate) const fn set_page(&mut self, page: PageSpec) {
        self.page = Some(page);
    }

    /// Structural ownership check used by translation.
    pub(crate) fn owns_alias(&self, alias: Alias) -> bool {
        alias.query == self.id && alias.index < self.aliases.len()
    }

    pub(crate) fn owns_parameter(&self, handle: ParameterHandle) -> bool {
        handle.query == self.id && handle.index < self.parameters.len()
    }
}
