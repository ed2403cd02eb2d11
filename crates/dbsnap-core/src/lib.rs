//! dbsnap Core - snapshot and change-detection kernel
//!
//! This crate provides the in-memory semantics behind database assertions:
//! - A closed, comparable value model for normalized column cells
//! - Rows, columns and snapshots materialized from a data source
//! - Primary-key aligned change detection between two snapshots
//! - Cursor-based navigation over changes, columns and rows
//! - Start/end point change recording against a data source
//!
//! Connection handling lives behind the [`reader::DataSource`] trait; see
//! `dbsnap-store` for the SQLite implementation.

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod navigation;
pub mod reader;
pub mod recorder;
pub mod value;

pub use dbsnap_core_types::schema;

// Re-export commonly used types
pub use config::{DbSnapConfig, DetectorConfig, LoggingConfig, UnkeyedAlignment};
pub use diff::{detect_changes, Change, ChangeColumn, ChangeDetector, ChangeType, Changes};
pub use errors::{DbSnapError, ExError, ExErrorKind, Result};
pub use model::{
    Column, ColumnFilter, Row, Snapshot, SourceDescription, SourceKind, SourceRef, ValueMismatch,
};
pub use navigation::{ChangesNavigator, FilterKey, SnapshotNavigator};
pub use reader::{build_schema_snapshot, build_snapshot, DataSource, SchemaDescription};
pub use recorder::{ChangeRecorder, ChangeScope};
pub use value::{
    normalize, DateTimeValue, DateValue, Number, RawCell, TimeValue, Value, ValueType,
};
