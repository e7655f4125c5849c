use crate::error::{ErrorClass, ErrorOrigin};
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Query construction, translation, and binding failures.
/// These are caller bugs, never transient faults; nothing retries them.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("parameter name ':{name}' is declared twice")]
    DuplicateParameter { name: String },

    #[error("cannot order by '{alias}.{member}': it has no column mapping")]
    InvalidOrderingTarget { alias: String, member: String },

    #[error("parameter {parameter} expects {expected} value(s), found {found}")]
    ParameterArityMismatch {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed query tree: {message}")]
    TranslationError { message: String },

    #[error("parameter {parameter} is not bound")]
    UnboundParameter { parameter: String },

    #[error("alias '{alias}' is not declared in this query")]
    UnknownAlias { alias: String },

    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("parameter {parameter} does not belong to this query")]
    UnknownParameter { parameter: String },

    #[error("entity '{entity}' has no relation '{relation}'")]
    UnknownRelation { entity: String, relation: String },
}

impl QueryError {
    pub(crate) fn translation(message: impl Into<String>) -> Self {
        Self::TranslationError {
            message: message.into(),
        }
    }

    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::TranslationError { .. } => ErrorClass::InvariantViolation,
            _ => ErrorClass::InvalidInput,
        }
    }

    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::UnboundParameter { .. } | Self::TranslationError { .. } => ErrorOrigin::Translate,
            Self::ParameterArityMismatch { .. } => ErrorOrigin::Executor,
            _ => ErrorOrigin::Query,
        }
    }
}
