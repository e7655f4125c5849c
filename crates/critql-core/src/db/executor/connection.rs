use crate::value::Value;
use derive_more::Deref;
use thiserror::Error as ThisError;

///
/// Row
///
/// One result row as an ordered list of (column label, value).
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Row(Vec<(String, Value)>);

impl Row {
    #[must_use]
    pub const fn new(columns: Vec<(String, Value)>) -> Self {
        Self(columns)
    }

    /// Value of the first column carrying `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }
}

impl From<Vec<(String, Value)>> for Row {
    fn from(columns: Vec<(String, Value)>) -> Self {
        Self(columns)
    }
}

///
/// ConnectionError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("database engine error: {message}")]
    Engine { message: String },

    #[error("column '{column}' holds an unsupported {kind} value")]
    UnsupportedValue { column: String, kind: &'static str },
}

///
/// Connection
///
/// Execution boundary: positional `?` values in, labelled rows out.
/// Values handed to a connection are already in storage form
/// (see [`Value::to_storage`]).
///

pub trait Connection {
    fn begin(&mut self) -> Result<(), ConnectionError>;

    fn commit(&mut self) -> Result<(), ConnectionError>;

    fn rollback(&mut self) -> Result<(), ConnectionError>;

    fn query(&mut self, sql: &str, values: &[Value]) -> Result<Vec<Row>, ConnectionError>;

    /// Run a statement and return the affected row count.
    fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64, ConnectionError>;

    /// Run an insert and return the generated key.
    fn insert(&mut self, sql: &str, values: &[Value]) -> Result<Value, ConnectionError>;
}
