//! Error handling for dbsnap-store
//!
//! Every SQLite failure surfaces as `SourceUnavailable` naming the table,
//! the request or the database it happened on.

use dbsnap_core::DbSnapError;

/// Result type alias using DbSnapError
pub type Result<T> = dbsnap_core::Result<T>;

/// Create a source error from rusqlite::Error
pub fn from_rusqlite(source_name: &str, err: rusqlite::Error) -> DbSnapError {
    DbSnapError::SourceUnavailable {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    }
}

/// Create a source error for a table `PRAGMA table_info` knows nothing about
pub fn no_such_table(table: &str) -> DbSnapError {
    DbSnapError::SourceUnavailable {
        source_name: table.to_string(),
        reason: format!("no such table: {}", table),
    }
}
