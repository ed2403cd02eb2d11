//! Change detection.
//!
//! ## Entry points
//!
//! ```ignore
//! use dbsnap_core::diff::{detect_changes, ChangeDetector};
//!
//! let changes = detect_changes(Some(&before), Some(&after))?;
//! let all = ChangeDetector::new(config.detector).detect_all(&before_tables, &after_tables)?;
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: the same snapshots always give the same ordered changes.
//! - **No-op exclusion**: rows equal in every column produce no change.
//! - **Immutability**: changes are shared, never mutated, and filtering
//!   builds new views over the same records.

pub mod engine;
pub mod model;

pub use engine::{detect_changes, ChangeDetector};
pub use model::{Change, ChangeColumn, ChangeType, Changes};
