//! dbsnap Store - SQLite data source
//!
//! Provides:
//! - Connection helpers (`db`)
//! - [`SqliteSource`], the `DataSource` collaborator reading table
//!   schemas, declared primary keys and rows from SQLite
//! - Cell classification from SQLite storage classes and declared column
//!   types into `RawCell`

pub mod classify;
pub mod db;
pub mod errors;
pub mod source;

// Re-export key types
pub use errors::Result;
pub use source::SqliteSource;
