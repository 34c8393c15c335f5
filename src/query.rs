//! Queries against object storage, run after the secret is in place.

use std::fmt;

use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use crate::credentials::SecretKind;
use crate::error::DatabaseError;
use crate::registrar::quote_literal;
use crate::session::{statement_error, DuckDbSession};

/// A set of parquet objects under a bucket prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    scheme: &'static str,
    bucket: String,
    prefix: String,
}

impl ObjectLocation {
    pub fn new(kind: SecretKind, bucket: &str, prefix: &str) -> Self {
        Self {
            scheme: kind.url_scheme(),
            bucket: bucket.trim_matches('/').to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    /// Glob matching every parquet object under the prefix.
    pub fn glob(&self) -> String {
        if self.prefix.is_empty() {
            format!("{}://{}/*.parquet", self.scheme, self.bucket)
        } else {
            format!("{}://{}/{}/*.parquet", self.scheme, self.bucket, self.prefix)
        }
    }

    /// Table expression usable in a `FROM` clause.
    pub fn relation(&self) -> String {
        format!("read_parquet({})", quote_literal(&self.glob()))
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob())
    }
}

/// One row of `DESCRIBE` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub nullable: String,
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column: {}, Type: {}, Nullable: {}",
            self.name, self.column_type, self.nullable
        )
    }
}

/// Fetch up to `limit` rows from `relation` and render them as a text table.
pub fn preview(
    session: &DuckDbSession,
    relation: &str,
    limit: usize,
) -> Result<String, DatabaseError> {
    let sql = format!("SELECT * FROM {} LIMIT {}", relation, limit);
    tracing::debug!(%sql, "Running preview query");

    let mut stmt = session.conn().prepare(&sql).map_err(statement_error)?;
    let batches: Vec<RecordBatch> = stmt.query_arrow([]).map_err(statement_error)?.collect();

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    tracing::debug!(rows, "Preview query finished");

    pretty_format_batches(&batches)
        .map(|table| table.to_string())
        .map_err(|e| DatabaseError::statement(format!("failed to format query result: {}", e)))
}

/// Describe the columns of `relation`.
pub fn describe(session: &DuckDbSession, relation: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
    let sql = format!("DESCRIBE SELECT * FROM {}", relation);
    tracing::debug!(%sql, "Describing relation");

    let mut stmt = session.conn().prepare(&sql).map_err(statement_error)?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                column_type: row.get(1)?,
                nullable: row.get(2)?,
            })
        })
        .map_err(statement_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(statement_error)?;

    Ok(columns)
}
