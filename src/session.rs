//! Embedded database sessions.
//!
//! [`DatabaseSession`] is the only surface the registrar needs: run one
//! statement and report a typed error. [`DuckDbSession`] implements it on top
//! of an in-process DuckDB connection.
//!
//! Sessions are not shared between threads. The connection is closed when
//! the session is dropped.

use std::path::Path;

use duckdb::Connection;

use crate::error::DatabaseError;

/// An open database session that can execute statements.
pub trait DatabaseSession {
    /// Execute `statement`, discarding any result rows.
    fn execute(&mut self, statement: &str) -> Result<(), DatabaseError>;
}

/// A DuckDB connection owned by exactly one caller.
pub struct DuckDbSession {
    conn: Connection,
}

impl DuckDbSession {
    /// Open (or create) a DuckDB database file.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|e| {
            DatabaseError::connection(format!(
                "failed to open DuckDB database at {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), "Opened DuckDB database");
        Ok(Self { conn })
    }

    /// Open a transient in-memory database.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DatabaseError::connection(format!("failed to open in-memory DuckDB: {}", e))
        })?;

        tracing::debug!("Opened in-memory DuckDB database");
        Ok(Self { conn })
    }

    /// Open `path`, or an in-memory database when `path` is `None`.
    pub fn open_optional(path: Option<&Path>) -> Result<Self, DatabaseError> {
        match path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    /// The DuckDB library version, e.g. `v1.1.3`.
    pub fn version(&self) -> Result<String, DatabaseError> {
        self.conn
            .query_row("SELECT version()", [], |row| row.get(0))
            .map_err(statement_error)
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl DatabaseSession for DuckDbSession {
    fn execute(&mut self, statement: &str) -> Result<(), DatabaseError> {
        self.conn.execute_batch(statement).map_err(statement_error)
    }
}

impl Drop for DuckDbSession {
    fn drop(&mut self) {
        tracing::debug!("Closing DuckDB session");
    }
}

/// Map a DuckDB failure onto the typed error surface.
pub(crate) fn statement_error(err: duckdb::Error) -> DatabaseError {
    DatabaseError::statement(err.to_string())
}
