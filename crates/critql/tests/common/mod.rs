#![allow(dead_code)]

use critql::{Session, core::db::executor::SqliteConnection};
use critql_testing_fixtures::User;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// In-memory session holding the manager-ordering population.
pub fn seeded() -> (Session<SqliteConnection>, Vec<User>) {
    init_tracing();
    let mut session = critql_testing_fixtures::open_session().unwrap();
    let users = critql_testing_fixtures::seed_managers(&mut session).unwrap();

    (session, users)
}

/// Every stored user, unordered.
pub fn all_users(session: &mut Session<SqliteConnection>) -> Vec<User> {
    let query = session.criteria().new_query("User").unwrap();

    session.load::<User>(&query).unwrap()
}

pub fn firstnames(users: &[User]) -> Vec<&str> {
    users.iter().map(User::firstname).collect()
}
