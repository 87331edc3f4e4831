//! Relational data source access.
//!
//! The pipeline talks to the database through the [`DataSource`] trait: one
//! call to run a statement and two calls to introspect the schema.
//! [`SqliteDataSource`] is the SQLite implementation.
//!
//! # Resource Handling
//!
//! Every call opens its own connection and drops it before returning, on
//! success and on failure alike. Statements run inside a transaction that is
//! always rolled back, so data-modifying statements report their shape but
//! never persist. Text holding more than one statement is refused before a
//! connection is opened.
//!
//! # Example
//!
//! ```
//! use nl2sql_assistant::executor::{DataSource, SqliteDataSource};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("demo.db");
//! let conn = rusqlite::Connection::open(&path).unwrap();
//! conn.execute_batch("CREATE TABLE items (item_name TEXT, price REAL);")
//!     .unwrap();
//! drop(conn);
//!
//! let source = SqliteDataSource::new(&path);
//! assert_eq!(source.list_tables().unwrap(), vec!["items"]);
//! ```

use std::{
    fmt,
    path::{Path, PathBuf}
};

use rusqlite::{Connection, OpenFlags, types::Value};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{AppResult, data_source_error},
    sanitizer::has_trailing_statement
};

/// A single cell value returned by the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>)
}

impl Scalar {
    /// Whether the value is stored as a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }

    /// Numeric interpretation of the value.
    ///
    /// Text is accepted when it parses as a finite number after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) if v.is_finite() => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
            Self::Blob(b) => write!(f, "<blob {} bytes>", b.len())
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(v) => Self::Integer(v),
            Value::Real(v) => Self::Real(v),
            Value::Text(s) => Self::Text(s),
            Value::Blob(b) => Self::Blob(b)
        }
    }
}

/// Tabular result of an executed statement.
///
/// Rows keep the order the database returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<Scalar>>
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        Self {
            columns,
            rows
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Relational store collaborator.
pub trait DataSource: Send + Sync {
    /// Run one statement and collect its columns and rows
    fn execute(&self, sql: &str) -> AppResult<QueryResult>;

    /// Names of all user tables
    fn list_tables(&self) -> AppResult<Vec<String>>;

    /// Column names of one table in declaration order
    fn list_columns(&self, table: &str) -> AppResult<Vec<String>>;
}

/// SQLite-backed data source.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    path: PathBuf
}

impl SqliteDataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> AppResult<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        )
        .map_err(data_source_error)
    }
}

impl DataSource for SqliteDataSource {
    fn execute(&self, sql: &str) -> AppResult<QueryResult> {
        // prepare() compiles only the first statement and drops the rest
        if has_trailing_statement(sql) {
            return Err(data_source_error(rusqlite::Error::MultipleStatement));
        }
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(data_source_error)?;
        let result = {
            let mut stmt = tx.prepare(sql).map_err(data_source_error)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();
            let width = columns.len();
            let mut rows = Vec::new();
            let mut cursor = stmt.query([]).map_err(data_source_error)?;
            while let Some(row) = cursor.next().map_err(data_source_error)? {
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    let value: Value = row.get(idx).map_err(data_source_error)?;
                    values.push(Scalar::from(value));
                }
                rows.push(values);
            }
            QueryResult::new(columns, rows)
        };
        tx.rollback().map_err(data_source_error)?;
        debug!(
            columns = result.columns.len(),
            rows = result.rows.len(),
            "statement executed"
        );
        Ok(result)
    }

    fn list_tables(&self) -> AppResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            )
            .map_err(data_source_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(data_source_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(data_source_error)?;
        Ok(names)
    }

    fn list_columns(&self, table: &str) -> AppResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(data_source_error)?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .map_err(data_source_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(data_source_error)?;
        Ok(names)
    }
}
