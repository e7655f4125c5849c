//! Query construction, SQL translation, and execution.
//!
//! Flow: [`query::CriteriaBuilder`] builds a [`query::CriteriaQuery`],
//! [`sql::translate`] lowers it into a [`sql::TranslatedQuery`], and an
//! [`executor::Transaction`] binds, runs, and maps it into [`Record`]s or
//! typed entities.

pub mod executor;
pub mod query;
mod record;
pub mod sql;

pub use record::{Link, Record};
