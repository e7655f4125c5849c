//! Minimal SQL AST for the statements critql emits, and its rendering.
//!
//! Identifiers are emitted unquoted; the catalog only admits plain,
//! non-reserved identifiers, and aliases are generated (`t0`, `t1`, ...).

use crate::db::query::{Alias, CompareOp, JoinKind, OrderDirection};

///
/// SqlWriter
///
/// Append-only SQL text buffer that counts emitted placeholders.
///

#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    placeholders: usize,
}

impl SqlWriter {
    pub(crate) fn append_syntax(&mut self, syntax: &str) {
        self.sql.push_str(syntax);
    }

    pub(crate) fn append_identifier(&mut self, ident: &str) {
        self.sql.push_str(ident);
    }

    pub(crate) fn append_alias(&mut self, alias: Alias) {
        self.sql.push_str(&alias.to_string());
    }

    pub(crate) fn append_placeholder(&mut self) {
        self.sql.push('?');
        self.placeholders += 1;
    }

    pub(crate) fn finish(self) -> (String, usize) {
        (self.sql, self.placeholders)
    }
}

pub(crate) trait ToSql {
    fn to_sql(&self, w: &mut SqlWriter);
}

fn comma_separated<T: ToSql>(items: &[T], w: &mut SqlWriter) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.append_syntax(", ");
        }
        item.to_sql(w);
    }
}

///
/// ColumnRef
///

#[derive(Clone, Debug)]
pub(crate) struct ColumnRef {
    pub(crate) alias: Alias,
    pub(crate) column: String,
}

impl ToSql for ColumnRef {
    fn to_sql(&self, w: &mut SqlWriter) {
        w.append_alias(self.alias);
        w.append_syntax(".");
        w.append_identifier(&self.column);
    }
}

///
/// SelectColumn
///

#[derive(Clone, Debug)]
pub(crate) struct SelectColumn {
    pub(crate) column: ColumnRef,
    pub(crate) label: String,
}

impl ToSql for SelectColumn {
    fn to_sql(&self, w: &mut SqlWriter) {
        self.column.to_sql(w);
        w.append_syntax(" AS ");
        w.append_identifier(&self.label);
    }
}

///
/// TableRef
///

#[derive(Clone, Debug)]
pub(crate) struct TableRef {
    pub(crate) table: String,
    pub(crate) alias: Alias,
}

impl ToSql for TableRef {
    fn to_sql(&self, w: &mut SqlWriter) {
        w.append_identifier(&self.table);
        w.append_syntax(" AS ");
        w.append_alias(self.alias);
    }
}

///
/// Join
///
/// Always rendered as an explicit ANSI join; there is no comma-join form.
///

#[derive(Clone, Debug)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) table: TableRef,
    pub(crate) source: ColumnRef,
    pub(crate) target: ColumnRef,
}

impl ToSql for Join {
    fn to_sql(&self, w: &mut SqlWriter) {
        w.append_syntax(&self.kind.to_string());
        w.append_syntax(" ");
        self.table.to_sql(w);
        w.append_syntax(" ON ");
        self.source.to_sql(w);
        w.append_syntax(" = ");
        self.target.to_sql(w);
    }
}

///
/// Expr
///

#[derive(Clone, Debug)]
pub(crate) enum Expr {
    /// Membership over `placeholders` positional values.
    In {
        column: ColumnRef,
        placeholders: usize,
        negated: bool,
    },
    Compare {
        column: ColumnRef,
        op: CompareOp,
    },
    IsNull {
        column: ColumnRef,
        negated: bool,
    },
}

impl ToSql for Expr {
    fn to_sql(&self, w: &mut SqlWriter) {
        match self {
            // An empty list matches nothing (or everything when negated);
            // `IN ()` is not portable.
            Self::In {
                placeholders: 0,
                negated,
                ..
            } => w.append_syntax(if *negated { "1 = 1" } else { "1 = 0" }),
            Self::In {
                column,
                placeholders,
                negated,
            } => {
                column.to_sql(w);
                w.append_syntax(if *negated { " NOT IN (" } else { " IN (" });
                for i in 0..*placeholders {
                    if i > 0 {
                        w.append_syntax(", ");
                    }
                    w.append_placeholder();
                }
                w.append_syntax(")");
            }
            Self::Compare { column, op } => {
                column.to_sql(w);
                w.append_syntax(&format!(" {op} "));
                w.append_placeholder();
            }
            Self::IsNull { column, negated } => {
                column.to_sql(w);
                w.append_syntax(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
        }
    }
}

///
/// OrderBy
///

#[derive(Clone, Debug)]
pub(crate) struct OrderBy {
    pub(crate) column: ColumnRef,
    pub(crate) direction: OrderDirection,
}

impl ToSql for OrderBy {
    fn to_sql(&self, w: &mut SqlWriter) {
        self.column.to_sql(w);
        w.append_syntax(" ");
        w.append_syntax(&self.direction.to_string());
    }
}

///
/// Select
///

#[derive(Clone, Debug)]
pub(crate) struct Select {
    pub(crate) columns: Vec<SelectColumn>,
    pub(crate) from: TableRef,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Vec<Expr>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

impl ToSql for Select {
    fn to_sql(&self, w: &mut SqlWriter) {
        w.append_syntax("SELECT ");
        comma_separated(&self.columns, w);
        w.append_syntax(" FROM ");
        self.from.to_sql(w);

        for join in &self.joins {
            w.append_syntax(" ");
            join.to_sql(w);
        }

        for (i, expr) in self.filter.iter().enumerate() {
            w.append_syntax(if i == 0 { " WHERE " } else { " AND " });
            expr.to_sql(w);
        }

        if !self.order_by.is_empty() {
            w.append_syntax(" ORDER BY ");
            comma_separated(&self.order_by, w);
        }

        if let Some(limit) = self.limit {
            w.append_syntax(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            w.append_syntax(&format!(" OFFSET {offset}"));
        }
    }
}

///
/// Insert
///

#[derive(Clone, Debug)]
pub(crate) struct Insert {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
}

impl ToSql for Insert {
    fn to_sql(&self, w: &mut SqlWriter) {
        w.append_syntax("INSERT INTO ");
        w.append_identifier(&self.table);

        if self.columns.is_empty() {
            w.append_syntax(" DEFAULT VALUES");
            return;
        }

        w.append_syntax(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                w.append_syntax(", ");
            }
            w.append_identifier(column);
        }
        w.append_syntax(") VALUES (");
        for i in 0..self.columns.len() {
            if i > 0 {
                w.append_syntax(", ");
            }
            w.append_placeholder();
        }
        w.append_syntax(")");
    }
}
