//! ## Crate layout
//! - `core`: catalog, criteria builder, SQL translator, executor, and
//!   observability.
//! - `error`: the public error type with a stable kind + origin taxonomy.
//!
//! Typical flow: register entities in a [`Catalog`], open a [`Session`],
//! build a criteria query through [`Session::criteria`], bind its parameters,
//! and load it inside a transaction.

pub use critql_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    catalog::Catalog,
    config::SessionConfig,
    db::executor::{Session, Transaction},
};
pub use error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        catalog::Catalog,
        config::SessionConfig,
        db::{
            Link, Record,
            executor::{Session, Transaction},
            query::{
                Alias, Arity, CompareOp, CriteriaBuilder, CriteriaQuery, JoinKind, OrderDirection,
            },
        },
        model::{EntityDescriptor, FieldDescriptor, RelationDescriptor, SqlType},
        traits::Entity as _,
        value::Value,
    };
}
