//! Database connection management

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open (or create) a SQLite database at the given path
///
/// # Errors
///
/// `SourceUnavailable` naming the path when SQLite cannot open it.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    Connection::open(path).map_err(|e| from_rusqlite(&path.display().to_string(), e))
}

/// Open an existing SQLite database without write access
///
/// # Errors
///
/// `SourceUnavailable` when the file does not exist or is not a database.
pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| from_rusqlite(&path.display().to_string(), e))
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
///
/// `SourceUnavailable` when SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| from_rusqlite(":memory:", e))
}

/// Quote an identifier for interpolation into SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
