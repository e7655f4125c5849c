//! Module: db::executor
//! Responsibility: bind and run translated queries inside transactions, and
//! map result rows into record graphs or typed entities.
//! Does not own: SQL text generation (`db::sql`).
//! Boundary: every statement runs through a [`Transaction`]; any failure
//! rolls it back before the error is returned.

mod connection;
mod mapping;
mod session;
#[cfg(feature = "sqlite")]
mod sqlite;
mod transaction;


pub use connection::{Connection, ConnectionError, Row};
pub use session::Session;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
pub use transaction::Transaction;
