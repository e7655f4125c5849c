use critql_core::{
    catalog::CatalogError,
    db::query::QueryError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match (err.query_error(), err.class) {
            (Some(query), _) => ErrorKind::Query(query.into()),
            (None, ErrorClass::NotFound) => ErrorKind::NotFound,
            (None, ErrorClass::Conflict) => ErrorKind::Conflict,
            (None, ErrorClass::Unsupported) => ErrorKind::Unsupported,
            (None, ErrorClass::InvalidInput) => ErrorKind::InvalidInput,
            (None, ErrorClass::Internal | ErrorClass::InvariantViolation) => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// The request was well-formed but conflicts with configured limits.
    Conflict,

    /// Invalid configuration or catalog input.
    InvalidInput,

    NotFound,

    /// Value or mapping shape the runtime cannot represent.
    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Unknown entity, relation, field, alias, or parameter.
    Invalid,

    /// Ordering clause targets an entity-valued path.
    InvalidOrdering,

    /// A declared parameter was never bound.
    Unbound,

    /// Bound value count disagrees with the placeholders it feeds.
    ArityMismatch,

    /// The query tree could not be lowered to SQL.
    Translation,
}

impl From<&QueryError> for QueryErrorKind {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::DuplicateParameter { .. }
            | QueryError::UnknownAlias { .. }
            | QueryError::UnknownEntity { .. }
            | QueryError::UnknownField { .. }
            | QueryError::UnknownParameter { .. }
            | QueryError::UnknownRelation { .. } => Self::Invalid,
            QueryError::InvalidOrderingTarget { .. } => Self::InvalidOrdering,
            QueryError::UnboundParameter { .. } => Self::Unbound,
            QueryError::ParameterArityMismatch { .. } => Self::ArityMismatch,
            QueryError::TranslationError { .. } => Self::Translation,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Catalog,
    Config,
    Connection,
    Executor,
    Mapping,
    Query,
    Transaction,
    Translate,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Catalog => Self::Catalog,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Connection => Self::Connection,
            CoreErrorOrigin::Executor => Self::Executor,
            CoreErrorOrigin::Mapping => Self::Mapping,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Transaction => Self::Transaction,
            CoreErrorOrigin::Translate => Self::Translate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_map_to_query_kinds() {
        let err = Error::from(QueryError::UnboundParameter {
            parameter: "?1".to_string(),
        });

        assert_eq!(err.kind, ErrorKind::Query(QueryErrorKind::Unbound));
        assert_eq!(err.origin, ErrorOrigin::Translate);
        assert_eq!(err.message, "parameter ?1 is not bound");
    }

    #[test]
    fn invariant_violations_are_internal() {
        let err = Error::from(InternalError::new(
            ErrorClass::InvariantViolation,
            CoreErrorOrigin::Transaction,
            "transaction is no longer active (committed)",
        ));

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.origin.to_string(), "Transaction");
    }

    #[test]
    fn catalog_errors_are_invalid_input() {
        let err = Error::from(CatalogError::DuplicateEntity {
            entity: "User".to_string(),
        });

        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.origin, ErrorOrigin::Catalog);
    }
}
