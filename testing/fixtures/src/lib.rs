//! Shared entities, schema, and seed data for critql integration tests.

mod user;

pub use user::User;

use critql_core::{
    catalog::{Catalog, CatalogError},
    config::SessionConfig,
    db::executor::{Session, SqliteConnection},
    error::InternalError,
};
use std::sync::Arc;

/// DDL for every fixture entity.
pub const SCHEMA_DDL: &str = "
CREATE TABLE users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    firstname     TEXT    NOT NULL,
    lastname      TEXT    NOT NULL,
    email_address TEXT    NOT NULL,
    age           INTEGER NOT NULL,
    active        INTEGER NOT NULL,
    created_at    INTEGER NOT NULL,
    manager_id    INTEGER REFERENCES users(id)
);
";

/// Catalog containing every fixture entity.
pub fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::builder().register_entity::<User>()?.build()
}

/// In-memory session with the fixture schema applied.
pub fn open_session() -> Result<Session<SqliteConnection>, InternalError> {
    open_session_with(SessionConfig::default())
}

pub fn open_session_with(
    config: SessionConfig,
) -> Result<Session<SqliteConnection>, InternalError> {
    let session = Session::open(config, Arc::new(catalog()?))?;
    session.execute_batch(SCHEMA_DDL)?;

    Ok(session)
}

/// Persist the manager-ordering population and return it in insert order:
/// Oliver (28) and Joachim (35) without a manager, Dave (43) managed by
/// Oliver, Thomas (31) managed by Joachim.
pub fn seed_managers(
    session: &mut Session<SqliteConnection>,
) -> Result<Vec<User>, InternalError> {
    let mut oliver = user("Oliver", "Gierke", 28);
    let mut joachim = user("Joachim", "Arrasz", 35);

    let mut tx = session.begin()?;
    tx.persist(&mut oliver)?;
    tx.persist(&mut joachim)?;

    let mut dave = user("Dave", "Matthews", 43);
    dave.set_manager(Some(&oliver));
    let mut thomas = user("Thomas", "Darimont", 31);
    thomas.set_manager(Some(&joachim));

    tx.persist(&mut dave)?;
    tx.persist(&mut thomas)?;
    tx.commit()?;

    Ok(vec![oliver, joachim, dave, thomas])
}

fn user(firstname: &str, lastname: &str, age: i32) -> User {
    let mut user = User::new(
        firstname,
        lastname,
        format!("{}@example.org", firstname.to_lowercase()),
    );
    user.set_age(age);

    user
}
