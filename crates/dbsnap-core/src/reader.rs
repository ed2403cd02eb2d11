//! Row/Column Reader
//!
//! Materializes a table, a filtered table, or a request into a
//! [`Snapshot`] through a [`DataSource`] collaborator. Every raw cell goes
//! through [`normalize`]; no driver type survives past this point.

use crate::errors::Result;
use crate::model::{Snapshot, SourceRef};
use crate::value::{normalize, RawCell};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Column names and declared primary keys of a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescription {
    /// In declaration (or result-set) order
    pub column_names: Vec<String>,
    /// Ordered by key position; empty when nothing is declared
    pub primary_key_names: Vec<String>,
}

/// Data-access collaborator
///
/// Implementations report `SourceUnavailable` for anything they cannot
/// read. Connection handling is theirs.
pub trait DataSource {
    /// Display name of the data source
    fn description(&self) -> String;

    /// # Errors
    ///
    /// `SourceUnavailable` when the source does not exist or cannot be read.
    fn describe_schema(&self, source: &SourceRef) -> Result<SchemaDescription>;

    /// Rows of `source` restricted to `columns`, cells in `columns` order.
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` when the rows cannot be read.
    fn fetch_rows(&self, source: &SourceRef, columns: &[String]) -> Result<Vec<Vec<RawCell>>>;

    /// Table names in declaration order
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` when the catalog cannot be read.
    fn list_tables(&self) -> Result<Vec<String>>;
}

/// Snapshot one source.
///
/// # Errors
///
/// - `SourceUnavailable` from the collaborator
/// - `ColumnNotFound` when the column filter names an undeclared column
/// - `SchemaMismatch` when a fetched row does not have one cell per column
pub fn build_snapshot<D: DataSource + ?Sized>(
    source: &D,
    source_ref: &SourceRef,
) -> Result<Snapshot> {
    let description = source_ref.description();
    log_op_start!("build_snapshot", table = %description.name);
    let start = Instant::now();

    let snapshot = build_snapshot_impl(source, source_ref).map_err(|e| {
        log_op_error!(
            "build_snapshot",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            table = %description.name
        );
        e
    })?;

    log_op_end!(
        "build_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        table = %description.name,
        rows = snapshot.row_count(),
        columns = snapshot.column_count()
    );
    Ok(snapshot)
}

fn build_snapshot_impl<D: DataSource + ?Sized>(
    source: &D,
    source_ref: &SourceRef,
) -> Result<Snapshot> {
    let schema = source.describe_schema(source_ref)?;
    let columns = match source_ref {
        SourceRef::Table { name, columns } => columns.apply(name, &schema.column_names)?,
        SourceRef::Request { .. } => schema.column_names,
    };
    let rows = source
        .fetch_rows(source_ref, &columns)?
        .into_iter()
        .map(|cells| cells.into_iter().map(normalize).collect())
        .collect();
    Snapshot::new(
        source_ref.description(),
        columns,
        schema.primary_key_names,
        rows,
    )
}

/// Snapshot every table the collaborator lists, in declaration order.
///
/// # Errors
///
/// The first error of [`DataSource::list_tables`] or [`build_snapshot`].
pub fn build_schema_snapshot<D: DataSource + ?Sized>(source: &D) -> Result<Vec<Snapshot>> {
    source
        .list_tables()?
        .into_iter()
        .map(|table| build_snapshot(source, &SourceRef::table(table)))
        .collect()
}
