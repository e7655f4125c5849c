//! Core runtime for critql: the entity catalog, the criteria builder, the SQL
//! translator, and the session/transaction executor that maps rows back into
//! entity graphs.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, connections, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        catalog::Catalog,
        db::query::{Alias, CriteriaBuilder, CriteriaQuery, JoinKind, OrderDirection},
        model::{EntityDescriptor, SqlType},
        traits::Entity,
        value::Value,
    };
}
