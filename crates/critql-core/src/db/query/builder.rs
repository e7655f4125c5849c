use crate::{
    catalog::Catalog,
    db::query::{
        Alias, Arity, CompareOp, CriteriaQuery, JoinClause, JoinKind, OrderClause,
        OrderDirection, PageSpec, ParameterHandle, Predicate, QueryError,
    },
    traits::Entity,
};

///
/// CriteriaBuilder
///
/// Typed construction surface for [`CriteriaQuery`] trees.
///
/// Joins are only ever declared by [`CriteriaBuilder::join`]. Predicates and
/// ordering address members through existing aliases; a relation used as a
/// predicate target compares its foreign-key column and introduces no join.
///

#[derive(Clone, Copy, Debug)]
pub struct CriteriaBuilder<'c> {
    catalog: &'c Catalog,
}

impl<'c> CriteriaBuilder<'c> {
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    // ------------------------------------------------------------------
    // Roots and joins
    // ------------------------------------------------------------------

    /// Empty query rooted at `entity` with a fresh root alias.
    pub fn new_query(&self, entity: &str) -> Result<CriteriaQuery, QueryError> {
        Ok(CriteriaQuery::new(self.catalog.describe(entity)?))
    }

    /// Empty query rooted at the entity type `E`.
    pub fn query_for<E: Entity>(&self) -> Result<CriteriaQuery, QueryError> {
        self.new_query(E::ENTITY_NAME)
    }

    /// Declare a join from `from` across `relation`, returning the new alias.
    pub fn join(
        &self,
        query: &mut CriteriaQuery,
        from: Alias,
        relation: &str,
        kind: JoinKind,
    ) -> Result<Alias, QueryError> {
        let source = query.alias_entity(from)?;
        let descriptor = source
            .relation(relation)
            .ok_or_else(|| QueryError::UnknownRelation {
                entity: source.name().to_string(),
                relation: relation.to_string(),
            })?;
        let target = self.catalog.describe(&descriptor.target)?;

        let alias = query.push_alias(target);
        query.push_join(JoinClause {
            source: from,
            relation: relation.to_string(),
            target: alias,
            kind,
        });

        Ok(alias)
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    /// `alias.field IN (...)` over a parameter bound at execution time.
    pub fn where_in(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
        parameter: ParameterHandle,
    ) -> Result<(), QueryError> {
        self.push_membership(query, alias, field, parameter, false)
    }

    /// `alias.field NOT IN (...)`.
    pub fn where_not_in(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
        parameter: ParameterHandle,
    ) -> Result<(), QueryError> {
        self.push_membership(query, alias, field, parameter, true)
    }

    /// `alias.field <op> ?`; the parameter must be bound to exactly one value.
    pub fn where_compare(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
        op: CompareOp,
        parameter: ParameterHandle,
    ) -> Result<(), QueryError> {
        let path = query.path(alias, field)?;
        query.parameter(parameter)?;
        query.push_predicate(Predicate::Compare {
            path,
            op,
            parameter,
        });

        Ok(())
    }

    pub fn where_null(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
    ) -> Result<(), QueryError> {
        let path = query.path(alias, field)?;
        query.push_predicate(Predicate::IsNull {
            path,
            negated: false,
        });

        Ok(())
    }

    pub fn where_not_null(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
    ) -> Result<(), QueryError> {
        let path = query.path(alias, field)?;
        query.push_predicate(Predicate::IsNull {
            path,
            negated: true,
        });

        Ok(())
    }

    fn push_membership(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
        parameter: ParameterHandle,
        negated: bool,
    ) -> Result<(), QueryError> {
        let path = query.path(alias, field)?;
        query.parameter(parameter)?;
        query.push_predicate(Predicate::In {
            path,
            parameter,
            negated,
        });

        Ok(())
    }

    // ------------------------------------------------------------------
    // Ordering and paging
    // ------------------------------------------------------------------

    /// Append an ordering clause; clauses apply left to right.
    pub fn order_by(
        &self,
        query: &mut CriteriaQuery,
        alias: Alias,
        field: &str,
        direction: OrderDirection,
    ) -> Result<(), QueryError> {
        let path = query.path(alias, field)?;
        if path.relation {
            return Err(QueryError::InvalidOrderingTarget {
                alias: alias.to_string(),
                member: field.to_string(),
            });
        }

        query.push_order(OrderClause { path, direction });

        Ok(())
    }

    pub fn page(&self, query: &mut CriteriaQuery, limit: u32, offset: u32) {
        query.set_page(PageSpec { limit, offset });
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Declare a variable-arity parameter (membership lists).
    pub fn declare_parameter(&self, query: &mut CriteriaQuery) -> ParameterHandle {
        query.push_parameter(None, Arity::Variable)
    }

    /// Declare a single-value parameter (comparisons).
    pub fn declare_scalar_parameter(&self, query: &mut CriteriaQuery) -> ParameterHandle {
        query.push_parameter(None, Arity::Single)
    }

    pub fn declare_named_parameter(
        &self,
        query: &mut CriteriaQuery,
        name: &str,
        arity: Arity,
    ) -> Result<ParameterHandle, QueryError> {
        if query
            .parameters()
            .iter()
            .any(|p| p.name.as_deref() == Some(name))
        {
            return Err(QueryError::DuplicateParameter {
                name: name.to_string(),
            });
        }

        Ok(query.push_parameter(Some(name.to_string()), arity))
    }
}
