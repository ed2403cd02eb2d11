pub mod column;
pub mod row;
pub mod snapshot;
pub mod source;

pub use column::{Column, ValueMismatch};
pub use row::{Row, RowLayout};
pub use snapshot::Snapshot;
pub use source::{ColumnFilter, SourceDescription, SourceKind, SourceRef};
