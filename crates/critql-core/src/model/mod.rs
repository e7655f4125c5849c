//! Runtime entity model.
//!
//! Descriptors here are the authoritative description of what the criteria
//! builder may reference and how the translator names tables and columns.
//! They are built once, registered in a [`Catalog`](crate::catalog::Catalog),
//! and never mutated afterwards.
mod entity;
mod field;
mod relation;

#[cfg(test)]
mod tests;

pub use entity::{EntityDescriptor, EntityDescriptorBuilder, Member};
pub use field::{FieldDescriptor, SqlType};
pub use relation::{Cardinality, RelationDescriptor};

use convert_case::{Case, Casing};

/// Default column name for a field or relation member.
pub(crate) fn default_column(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Plain SQL identifier check (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Keywords reserved by SQL-92 or the common engines. Stored uppercase and
/// sorted for binary search.
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK",
    "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM",
    "FULL", "GRANT", "GROUP", "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO",
    "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR",
    "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SESSION_USER", "SET",
    "SOME", "SYSTEM_USER", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER",
    "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Whether `name` is a reserved SQL keyword, ignoring case.
pub(crate) fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS
        .binary_search(&name.to_ascii_uppercase().as_str())
        .is_ok()
}
