use crate::{
    catalog::CatalogError,
    db::{executor::ConnectionError, query::QueryError},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every executor-facing operation returns this type; the structured source
/// (when there is one) travels in `detail`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an executor-origin invalid-input error.
    pub(crate) fn executor_invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidInput, ErrorOrigin::Executor, message.into())
    }

    /// Construct the error for a relation that references an entity which
    /// has no identity yet.
    pub fn unpersisted_link(entity: &str, relation: &str) -> Self {
        Self::executor_invalid_input(format!(
            "relation '{entity}.{relation}' references an entity that has not been persisted"
        ))
    }

    /// Construct a mapping-origin invariant violation.
    pub(crate) fn mapping_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Mapping,
            message.into(),
        )
    }

    /// Construct a mapping-origin unsupported error.
    pub(crate) fn mapping_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Mapping, message.into())
    }

    /// Construct a transaction-origin error for use of a finished transaction.
    pub(crate) fn transaction_closed(state: &str) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Transaction,
            format!("transaction is no longer active ({state})"),
        )
    }

    /// Construct a config-origin invalid-input error.
    pub(crate) fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidInput, ErrorOrigin::Config, message.into())
    }

    /// Construct a standardized entity-type mismatch error.
    pub(crate) fn entity_mismatch(expected: &str, found: &str) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Executor,
            format!("query is rooted at entity '{found}', cannot map rows into '{expected}'"),
        )
    }

    /// Return the query error carried by this error, if any.
    #[must_use]
    pub const fn query_error(&self) -> Option<&QueryError> {
        match &self.detail {
            Some(ErrorDetail::Query(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Catalog(CatalogError),
    #[error("{0}")]
    Connection(ConnectionError),
    #[error("{0}")]
    Query(QueryError),
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        let origin = err.origin();

        Self {
            class: err.class(),
            origin,
            message: err.to_string(),
            detail: Some(ErrorDetail::Query(err)),
        }
    }
}

impl From<CatalogError> for InternalError {
    fn from(err: CatalogError) -> Self {
        Self {
            class: ErrorClass::InvalidInput,
            origin: ErrorOrigin::Catalog,
            message: err.to_string(),
            detail: Some(ErrorDetail::Catalog(err)),
        }
    }
}

impl From<ConnectionError> for InternalError {
    fn from(err: ConnectionError) -> Self {
        let class = match &err {
            ConnectionError::UnsupportedValue { .. } => ErrorClass::Unsupported,
            ConnectionError::Engine { .. } => ErrorClass::Internal,
        };

        Self {
            class,
            origin: ErrorOrigin::Connection,
            message: err.to_string(),
            detail: Some(ErrorDetail::Connection(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Conflict,
    Unsupported,
    InvariantViolation,
    InvalidInput,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::InvalidInput => "invalid_input",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Catalog,
    Query,
    Translate,
    Executor,
    Connection,
    Transaction,
    Mapping,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Catalog => "catalog",
            Self::Query => "query",
            Self::Translate => "translate",
            Self::Executor => "executor",
            Self::Connection => "connection",
            Self::Transaction => "transaction",
            Self::Mapping => "mapping",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
