//! Cursor-based navigation over changes, columns and rows.
//!
//! Every navigator keeps one "next index" cursor per filter. A successful
//! fetch at index `i` sets that cursor to `i + 1`; a failed fetch leaves it
//! where it was. `next` only ever moves a cursor forward, while an indexed
//! fetch may set it back. Cursors of different filters are independent.

pub mod changes;
pub mod snapshot;

pub use changes::{ChangesNavigator, FilterKey};
pub use snapshot::SnapshotNavigator;
