use crate::db::query::{Alias, ParameterHandle};
use derive_more::Display;

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CompareOp {
    #[display("=")]
    Eq,
    #[display("<>")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
}

///
/// FieldPath
///
/// A resolved member access through an alias. Relation members resolve to
/// their foreign-key column on the same alias; resolving a path never
/// declares or alters a join.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldPath {
    pub alias: Alias,
    pub member: String,
    pub column: String,
    pub relation: bool,
}

///
/// Predicate
///
/// One conjunct of the WHERE clause. Predicates on a query are AND-ed in
/// declaration order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    In {
        path: FieldPath,
        parameter: ParameterHandle,
        negated: bool,
    },
    Compare {
        path: FieldPath,
        op: CompareOp,
        parameter: ParameterHandle,
    },
    IsNull {
        path: FieldPath,
        negated: bool,
    },
}

impl Predicate {
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        match self {
            Self::In { path, .. } | Self::Compare { path, .. } | Self::IsNull { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn parameter(&self) -> Option<ParameterHandle> {
        match self {
            Self::In { parameter, .. } | Self::Compare { parameter, .. } => Some(*parameter),
            Self::IsNull { .. } => None,
        }
    }
}
