//! Row-to-record mapping for translated queries.
//!
//! Each alias slot of the layout maps to at most one record per row. An
//! optional slot whose columns are all null maps to nothing; joined targets
//! are attached to their source as `Link::Loaded`.

use crate::{
    db::{
        Link, Record,
        executor::Row,
        sql::{AliasLayout, ResultLayout},
    },
    error::InternalError,
    value::Value,
};
use std::sync::Arc;
use tracing::trace;

pub(crate) fn map_rows(layout: &ResultLayout, rows: &[Row]) -> Result<Vec<Record>, InternalError> {
    rows.iter().map(|row| map_row(layout, row)).collect()
}

fn map_row(layout: &ResultLayout, row: &Row) -> Result<Record, InternalError> {
    let mut slots = Vec::with_capacity(layout.aliases.len());
    for alias in &layout.aliases {
        slots.push(map_alias(alias, row)?);
    }

    // Later joins may hang off earlier targets; attach deepest first.
    for link in layout.links.iter().rev() {
        let target = slots.get_mut(link.target).and_then(Option::take);
        let Some(source) = slots.get_mut(link.source).and_then(Option::as_mut) else {
            continue;
        };

        let state = match target {
            Some(record) => Link::Loaded(Box::new(record)),
            None => Link::Absent,
        };
        source.set_link(&link.relation, state);
    }

    slots
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| InternalError::mapping_invariant("root alias row is entirely null"))
}

fn map_alias(alias: &AliasLayout, row: &Row) -> Result<Option<Record>, InternalError> {
    let mut raw: Vec<(&str, Option<_>, &Value)> = Vec::with_capacity(alias.columns.len());
    for column in &alias.columns {
        let value = row.get(&column.label).ok_or_else(|| {
            InternalError::mapping_invariant(format!(
                "result row has no column '{}'",
                column.label
            ))
        })?;
        raw.push((column.member.as_str(), column.sql_type, value));
    }

    let entity = alias.entity.name();
    if raw.iter().all(|(_, _, v)| v.is_null()) {
        if alias.optional {
            trace!(entity, "outer-joined row absent");
            return Ok(None);
        }

        return Err(InternalError::mapping_invariant(format!(
            "inner-joined '{entity}' row is entirely null"
        )));
    }

    let mut record = Record::new(Arc::clone(&alias.entity));
    for (member, sql_type, value) in raw {
        match sql_type {
            Some(ty) => record.set_value(member, value.clone().coerce(ty)?),
            None if value.is_null() => record.set_link(member, Link::Absent),
            None => record.set_link(member, Link::Deferred(value.clone())),
        }
    }

    if record.id().is_none() {
        return Err(InternalError::mapping_invariant(format!(
            "'{entity}' row has a null primary key"
        )));
    }

    trace!(entity, "mapped row");

    Ok(Some(record))
}
