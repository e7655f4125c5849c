//! Module: db::sql
//! Responsibility: lower a `CriteriaQuery` into parameterized SQL text, the
//! positional parameter order, and the result layout used by row mapping.
//! Does not own: binding values or running statements.
//! Boundary: output is deterministic for an unmodified query tree.

mod ast;

#[cfg(test)]
mod tests;

use crate::{
    db::query::{CriteriaQuery, JoinKind, ParameterHandle, Predicate, QueryError},
    model::{EntityDescriptor, SqlType},
};
use ast::{
    ColumnRef, Expr, Insert, Join, OrderBy, Select, SelectColumn, SqlWriter, TableRef, ToSql,
};
use std::sync::Arc;
use tracing::trace;

///
/// ParameterSlot
///
/// One run of consecutive placeholders fed by a single parameter.
/// Slots appear in the order their placeholders appear in the SQL text.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterSlot {
    pub parameter: ParameterHandle,
    pub label: String,
    pub placeholders: usize,
}

///
/// ColumnLayout
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnLayout {
    /// Result column label (`<alias>_<column>`).
    pub label: String,
    /// Field or relation name on the alias entity.
    pub member: String,
    /// Declared type for scalar fields; `None` for relation keys.
    pub sql_type: Option<SqlType>,
}

///
/// AliasLayout
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AliasLayout {
    pub entity: Arc<EntityDescriptor>,
    pub columns: Vec<ColumnLayout>,
    /// Reached through at least one LEFT OUTER join; an all-null row is legal.
    pub optional: bool,
}

///
/// LinkLayout
///
/// Join edge between two alias slots of the layout.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkLayout {
    pub source: usize,
    pub relation: String,
    pub target: usize,
}

///
/// ResultLayout
///
/// Shape of every result row: alias slots (root first) and join edges in
/// declaration order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultLayout {
    pub aliases: Vec<AliasLayout>,
    pub links: Vec<LinkLayout>,
}

///
/// TranslatedQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranslatedQuery {
    sql: String,
    parameter_order: Vec<ParameterSlot>,
    layout: ResultLayout,
}

impl TranslatedQuery {
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn parameter_order(&self) -> &[ParameterSlot] {
        &self.parameter_order
    }

    #[must_use]
    pub const fn layout(&self) -> &ResultLayout {
        &self.layout
    }

    /// Root entity of the translated query.
    #[must_use]
    pub fn entity(&self) -> &EntityDescriptor {
        &self.layout.aliases[0].entity
    }

    /// Total placeholders emitted into the SQL text.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.parameter_order.iter().map(|s| s.placeholders).sum()
    }
}

/// Translate a fully bound criteria query.
pub fn translate(query: &CriteriaQuery) -> Result<TranslatedQuery, QueryError> {
    for parameter in query.parameters() {
        if !query.bindings().contains(parameter.handle) {
            return Err(QueryError::UnboundParameter {
                parameter: parameter.label(),
            });
        }
    }

    let layout = lower_layout(query)?;
    let mut parameter_order = Vec::new();
    let select = lower_select(query, &layout, &mut parameter_order)?;

    let mut writer = SqlWriter::default();
    select.to_sql(&mut writer);
    let (sql, placeholders) = writer.finish();

    let expected: usize = parameter_order.iter().map(|s| s.placeholders).sum();
    if placeholders != expected {
        return Err(QueryError::translation(format!(
            "emitted {placeholders} placeholder(s) for {expected} bound value(s)"
        )));
    }

    trace!(sql = %sql, placeholders, "translated criteria query");

    Ok(TranslatedQuery {
        sql,
        parameter_order,
        layout,
    })
}

/// Render `INSERT INTO <table> (<columns>) VALUES (?, ...)`.
pub(crate) fn translate_insert(entity: &EntityDescriptor, columns: &[&str]) -> String {
    let insert = Insert {
        table: entity.table().to_string(),
        columns: columns.iter().map(ToString::to_string).collect(),
    };

    let mut writer = SqlWriter::default();
    insert.to_sql(&mut writer);

    writer.finish().0
}

/// Count `?` placeholders outside single-quoted literals.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let mut in_literal = false;
    let mut count = 0;

    for c in sql.chars() {
        match c {
            '\'' => in_literal = !in_literal,
            '?' if !in_literal => count += 1,
            _ => {}
        }
    }

    count
}

// ----------------------------------------------------------------------
// Lowering
// ----------------------------------------------------------------------

fn lower_layout(query: &CriteriaQuery) -> Result<ResultLayout, QueryError> {
    let alias_count = query.aliases().count();
    let mut optional = vec![false; alias_count];
    let mut joined = vec![false; alias_count];
    let mut links = Vec::with_capacity(query.joins().len());

    for join in query.joins() {
        if !query.owns_alias(join.source) || !query.owns_alias(join.target) {
            return Err(QueryError::translation(format!(
                "join '{}' references a dangling alias",
                join.relation
            )));
        }

        let (source, target) = (join.source.index(), join.target.index());
        if target <= source || joined[target] {
            return Err(QueryError::translation(format!(
                "alias {} is not introduced by exactly one later join",
                join.target
            )));
        }

        joined[target] = true;
        optional[target] = optional[source] || join.kind == JoinKind::LeftOuter;
        links.push(LinkLayout {
            source,
            relation: join.relation.clone(),
            target,
        });
    }

    if joined.iter().skip(1).any(|j| !j) {
        return Err(QueryError::translation("alias declared without a join"));
    }

    let aliases = query
        .aliases()
        .map(|(alias, entity)| AliasLayout {
            entity: Arc::clone(entity),
            columns: entity
                .members()
                .map(|member| ColumnLayout {
                    label: format!("{alias}_{}", member.column()),
                    member: member.name().to_string(),
                    sql_type: member.sql_type(),
                })
                .collect(),
            optional: optional[alias.index()],
        })
        .collect();

    Ok(ResultLayout { aliases, links })
}

fn lower_select(
    query: &CriteriaQuery,
    layout: &ResultLayout,
    parameter_order: &mut Vec<ParameterSlot>,
) -> Result<Select, QueryError> {
    let columns = query
        .aliases()
        .flat_map(|(alias, entity)| {
            entity
                .members()
                .zip(&layout.aliases[alias.index()].columns)
                .map(move |(member, col)| SelectColumn {
                    column: ColumnRef {
                        alias,
                        column: member.column().to_string(),
                    },
                    label: col.label.clone(),
                })
        })
        .collect();

    let mut joins = Vec::with_capacity(query.joins().len());
    for join in query.joins() {
        let source = query.alias_entity(join.source)?;
        let target = query.alias_entity(join.target)?;
        let relation = source.relation(&join.relation).ok_or_else(|| {
            QueryError::translation(format!(
                "join relation '{}.{}' is not declared",
                source.name(),
                join.relation
            ))
        })?;

        joins.push(Join {
            kind: join.kind,
            table: TableRef {
                table: target.table().to_string(),
                alias: join.target,
            },
            source: ColumnRef {
                alias: join.source,
                column: relation.fk_column.clone(),
            },
            target: ColumnRef {
                alias: join.target,
                column: target.primary_key().column.clone(),
            },
        });
    }

    let mut filter = Vec::with_capacity(query.predicates().len());
    for predicate in query.predicates() {
        filter.push(lower_predicate(query, predicate, parameter_order)?);
    }

    let mut order_by = Vec::with_capacity(query.order().len());
    for clause in query.order() {
        let path = &clause.path;
        let mapped = query.owns_alias(path.alias)
            && query
                .alias_entity(path.alias)?
                .field(&path.member)
                .is_some_and(|f| f.column == path.column);
        if !mapped {
            return Err(QueryError::InvalidOrderingTarget {
                alias: path.alias.to_string(),
                member: path.member.clone(),
            });
        }

        order_by.push(OrderBy {
            column: ColumnRef {
                alias: path.alias,
                column: path.column.clone(),
            },
            direction: clause.direction,
        });
    }

    let page = query.page();

    Ok(Select {
        columns,
        from: TableRef {
            table: query.entity().table().to_string(),
            alias: query.root(),
        },
        joins,
        filter,
        order_by,
        limit: page.map(|p| p.limit),
        offset: page.map(|p| p.offset).filter(|o| *o > 0),
    })
}

fn lower_predicate(
    query: &CriteriaQuery,
    predicate: &Predicate,
    parameter_order: &mut Vec<ParameterSlot>,
) -> Result<Expr, QueryError> {
    let path = predicate.path();
    if !query.owns_alias(path.alias) {
        return Err(QueryError::translation(format!(
            "predicate on '{}' references a dangling alias",
            path.member
        )));
    }

    let column = ColumnRef {
        alias: path.alias,
        column: path.column.clone(),
    };

    let bound = match predicate.parameter() {
        Some(handle) => {
            if !query.owns_parameter(handle) {
                return Err(QueryError::translation(format!(
                    "predicate on '{}' references an undeclared parameter",
                    path.member
                )));
            }
            let parameter = query.parameter(handle)?;
            let values = query.bindings().get(handle).ok_or_else(|| {
                QueryError::UnboundParameter {
                    parameter: parameter.label(),
                }
            })?;

            Some((parameter.label(), handle, values.len()))
        }
        None => None,
    };

    let expr = match (predicate, bound) {
        (Predicate::In { negated, .. }, Some((label, handle, count))) => {
            parameter_order.push(ParameterSlot {
                parameter: handle,
                label,
                placeholders: count,
            });
            Expr::In {
                column,
                placeholders: count,
                negated: *negated,
            }
        }
        (Predicate::Compare { op, .. }, Some((label, handle, count))) => {
            if count != 1 {
                return Err(QueryError::ParameterArityMismatch {
                    parameter: label,
                    expected: 1,
                    found: count,
                });
            }
            parameter_order.push(ParameterSlot {
                parameter: handle,
                label,
                placeholders: 1,
            });
            Expr::Compare { column, op: *op }
        }
        (Predicate::IsNull { negated, .. }, None) => Expr::IsNull {
            column,
            negated: *negated,
        },
        _ => {
            return Err(QueryError::translation(
                "predicate and parameter shape disagree",
            ));
        }
    };

    Ok(expr)
}
