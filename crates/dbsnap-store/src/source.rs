//! SQLite data source
//!
//! Table rows come back ordered by the declared primary key so two reads
//! of an unchanged table line up row for row. Tables without a key keep
//! SQLite's scan order.

use crate::classify::{classify, DeclaredKind};
use crate::db::{self, quote_ident};
use crate::errors::{from_rusqlite, no_such_table, Result};
use dbsnap_core::{DataSource, RawCell, SchemaDescription, SourceRef};
use rusqlite::{Connection, Statement};
use std::path::Path;
use tracing::debug;

/// [`DataSource`] over one SQLite connection
pub struct SqliteSource {
    conn: Connection,
    name: String,
}

impl SqliteSource {
    /// Wrap an open connection; `name` is what change sets report as
    /// their source.
    pub fn new(conn: Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    /// # Errors
    ///
    /// `SourceUnavailable` when the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = db::open(path)?;
        Ok(Self::new(conn, path.display().to_string()))
    }

    /// # Errors
    ///
    /// `SourceUnavailable` when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?, ":memory:"))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }

    fn describe_table(&self, table: &str) -> Result<SchemaDescription> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| from_rusqlite(table, e))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)?)))
            .map_err(|e| from_rusqlite(table, e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite(table, e))?;

        if columns.is_empty() {
            return Err(no_such_table(table));
        }

        let mut keys: Vec<(i64, String)> = columns
            .iter()
            .filter(|(_, pk)| *pk > 0)
            .map(|(name, pk)| (*pk, name.clone()))
            .collect();
        keys.sort_by_key(|(position, _)| *position);

        Ok(SchemaDescription {
            column_names: columns.into_iter().map(|(name, _)| name).collect(),
            primary_key_names: keys.into_iter().map(|(_, name)| name).collect(),
        })
    }

    fn describe_request(&self, sql: &str) -> Result<SchemaDescription> {
        let stmt = self.conn.prepare(sql).map_err(|e| from_rusqlite(sql, e))?;
        Ok(SchemaDescription {
            column_names: stmt.column_names().into_iter().map(String::from).collect(),
            primary_key_names: Vec::new(),
        })
    }

    fn table_query(&self, table: &str, columns: &[String]) -> Result<String> {
        let projection = if columns.is_empty() {
            "1".to_string()
        } else {
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(table));
        let keys = self.describe_table(table)?.primary_key_names;
        if !keys.is_empty() {
            let order = keys
                .iter()
                .map(|k| quote_ident(k))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        Ok(sql)
    }
}

/// Run a prepared statement and classify every cell.
///
/// With `width == 0` the rows are kept but carry no cells.
fn read_rows(
    stmt: &mut Statement<'_>,
    width: usize,
    source_name: &str,
) -> Result<Vec<Vec<RawCell>>> {
    let kinds: Vec<DeclaredKind> = stmt
        .columns()
        .iter()
        .take(width)
        .map(|c| DeclaredKind::from_decl_type(c.decl_type()))
        .collect();

    let mut rows = stmt.query([]).map_err(|e| from_rusqlite(source_name, e))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| from_rusqlite(source_name, e))? {
        let mut cells = Vec::with_capacity(kinds.len());
        for (i, kind) in kinds.iter().enumerate() {
            let cell = row.get_ref(i).map_err(|e| from_rusqlite(source_name, e))?;
            cells.push(classify(cell, *kind));
        }
        out.push(cells);
    }
    Ok(out)
}

impl DataSource for SqliteSource {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn describe_schema(&self, source: &SourceRef) -> Result<SchemaDescription> {
        match source {
            SourceRef::Table { name, .. } => self.describe_table(name),
            SourceRef::Request { sql } => self.describe_request(sql),
        }
    }

    fn fetch_rows(&self, source: &SourceRef, columns: &[String]) -> Result<Vec<Vec<RawCell>>> {
        let (sql, source_name) = match source {
            SourceRef::Table { name, .. } => (self.table_query(name, columns)?, name.as_str()),
            SourceRef::Request { sql } => (sql.clone(), sql.as_str()),
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| from_rusqlite(source_name, e))?;
        let rows = read_rows(&mut stmt, columns.len(), source_name)?;
        debug!(source = %source_name, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY rowid",
            )
            .map_err(|e| from_rusqlite(&self.name, e))?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| from_rusqlite(&self.name, e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite(&self.name, e))?;
        Ok(tables)
    }
}
