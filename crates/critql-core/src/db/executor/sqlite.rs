use crate::{
    config::SessionConfig,
    db::executor::{Connection, ConnectionError, Row},
    value::Value,
};
use rusqlite::{params_from_iter, types::Value as SqliteValue};
use std::path::Path;
use tracing::debug;

///
/// SqliteConnection
///
/// [`Connection`] over a `rusqlite` handle. Foreign keys are enforced.
///

#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open_in_memory() -> Result<Self, ConnectionError> {
        Self::init(rusqlite::Connection::open_in_memory()?)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConnectionError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening sqlite database");

        Self::init(rusqlite::Connection::open(path)?)
    }

    /// Open the database named by `config.database.path`, in memory when unset.
    pub fn open_with(config: &SessionConfig) -> Result<Self, ConnectionError> {
        match &config.database.path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    /// Run caller-owned DDL or fixture SQL outside the transaction protocol.
    pub fn execute_batch(&self, sql: &str) -> Result<(), ConnectionError> {
        self.conn.execute_batch(sql)?;

        Ok(())
    }

    fn init(conn: rusqlite::Connection) -> Result<Self, ConnectionError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }
}

impl Connection for SqliteConnection {
    fn begin(&mut self) -> Result<(), ConnectionError> {
        self.execute_batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), ConnectionError> {
        self.execute_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), ConnectionError> {
        self.execute_batch("ROLLBACK")
    }

    fn query(&mut self, sql: &str, values: &[Value]) -> Result<Vec<Row>, ConnectionError> {
        let params = bind_values(values)?;
        let mut stmt = self.conn.prepare(sql)?;
        let labels: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(labels.len());
            for (index, label) in labels.iter().enumerate() {
                let raw: SqliteValue = row.get(index)?;
                columns.push((label.clone(), read_value(label, raw)?));
            }
            out.push(Row::new(columns));
        }

        Ok(out)
    }

    fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64, ConnectionError> {
        let params = bind_values(values)?;
        let changed = self.conn.execute(sql, params_from_iter(params.iter()))?;

        u64::try_from(changed).map_err(|_| ConnectionError::Engine {
            message: format!("affected row count {changed} does not fit in u64"),
        })
    }

    fn insert(&mut self, sql: &str, values: &[Value]) -> Result<Value, ConnectionError> {
        let params = bind_values(values)?;
        self.conn.execute(sql, params_from_iter(params.iter()))?;

        Ok(Value::Int(self.conn.last_insert_rowid()))
    }
}

impl From<rusqlite::Error> for ConnectionError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Engine {
            message: err.to_string(),
        }
    }
}

// Storage-form values only; timestamps must be encoded by the caller.
fn bind_values(values: &[Value]) -> Result<Vec<SqliteValue>, ConnectionError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Null => Ok(SqliteValue::Null),
            Value::Bool(v) => Ok(SqliteValue::Integer(i64::from(*v))),
            Value::Int(v) => Ok(SqliteValue::Integer(*v)),
            Value::Text(v) => Ok(SqliteValue::Text(v.clone())),
            Value::Timestamp(_) => Err(ConnectionError::UnsupportedValue {
                column: format!("?{}", index + 1),
                kind: value.kind_label(),
            }),
        })
        .collect()
}

fn read_value(label: &str, raw: SqliteValue) -> Result<Value, ConnectionError> {
    match raw {
        SqliteValue::Null => Ok(Value::Null),
        SqliteValue::Integer(v) => Ok(Value::Int(v)),
        SqliteValue::Text(v) => Ok(Value::Text(v)),
        SqliteValue::Real(_) => Err(ConnectionError::UnsupportedValue {
            column: label.to_string(),
            kind: "real",
        }),
        SqliteValue::Blob(_) => Err(ConnectionError::UnsupportedValue {
            column: label.to_string(),
            kind: "blob",
        }),
    }
}
