use crate::value::ValueType;
use thiserror::Error;

/// Result type alias using DbSnapError
pub type Result<T> = std::result::Result<T, DbSnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (and the presentation
/// layer building assertion messages) can match on without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Data source
    /// The collaborator could not produce schema or rows
    SourceUnavailable,
    /// A requested column does not exist in the source
    ColumnNotFound,

    // Integrity
    /// Two snapshots of the same table disagree on their column set
    SchemaMismatch,
    /// Two rows of one snapshot share a primary-key tuple
    DuplicateKey,

    // Expectations
    /// A value was checked against an incompatible expected type
    TypeMismatch,
    /// A navigation index is outside `[0, size)`
    IndexOutOfRange,
    /// An expected value list does not have the size of the actual list
    SizeMismatch,
    /// A value could not be constructed (out-of-range date, malformed number)
    InvalidValue,

    // Usage
    InvalidState,
    Config,

    // Integration/IO
    Serialization,
    /// A file (such as a configuration file) could not be read
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::SourceUnavailable => "ERR_SOURCE_UNAVAILABLE",
            ExErrorKind::ColumnNotFound => "ERR_COLUMN_NOT_FOUND",
            ExErrorKind::SchemaMismatch => "ERR_SCHEMA_MISMATCH",
            ExErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::IndexOutOfRange => "ERR_INDEX_OUT_OF_RANGE",
            ExErrorKind::SizeMismatch => "ERR_SIZE_MISMATCH",
            ExErrorKind::InvalidValue => "ERR_INVALID_VALUE",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
        }
    }
}

/// Canonical structured error type
///
/// Classification plus the context a message builder needs: the operation,
/// the table, and the index involved.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    index: Option<usize>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            index: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table (or request) context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add index context
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the index context, if any
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(index) = self.index {
            write!(f, " (index: {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for dbsnap operations
///
/// Every variant carries the structured context needed to build a precise
/// assertion message (index and bound, expected and actual type, table name).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbSnapError {
    // ===== Data source =====
    /// The data source could not produce the schema or the rows
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A named column does not exist in the source
    #[error("Column <{column}> does not exist in {table}")]
    ColumnNotFound { table: String, column: String },

    // ===== Integrity =====
    /// Two snapshots of the same logical table disagree on their columns
    #[error("Schema mismatch on {table}: {reason}")]
    SchemaMismatch { table: String, reason: String },

    /// Two rows of the same snapshot share a primary-key tuple
    #[error("Duplicate primary key {key} in {table}")]
    DuplicateKey { table: String, key: String },

    // ===== Expectations =====
    /// A value is not of any of the expected types
    #[error(
        "Expecting <{value}>{} to be of type <{}> but was of type <{actual}>",
        index_suffix(.index),
        type_list(.expected)
    )]
    TypeMismatch {
        value: String,
        actual: ValueType,
        expected: Vec<ValueType>,
        index: Option<usize>,
    },

    /// Navigation index outside `[0, size)`
    #[error("Index {index} out of the limits [0, {size}[")]
    IndexOutOfRange { index: usize, size: usize },

    /// The expected value list does not have the size of the actual one
    #[error("Expecting size to be <{expected}> but was <{actual}>")]
    SizeMismatch { actual: usize, expected: usize },

    /// A value could not be constructed from its components or text
    #[error("Invalid value: {reason}")]
    InvalidValue { reason: String },

    // ===== Usage =====
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A file could not be read
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

fn index_suffix(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at index {}", i),
        None => String::new(),
    }
}

fn type_list(types: &[ValueType]) -> String {
    let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    if names.len() == 1 {
        names[0].clone()
    } else {
        format!("[{}]", names.join(", "))
    }
}

impl DbSnapError {
    /// Attach the row index to a `TypeMismatch`; other variants pass through.
    pub fn at_index(self, at: usize) -> Self {
        match self {
            DbSnapError::TypeMismatch {
                value,
                actual,
                expected,
                ..
            } => DbSnapError::TypeMismatch {
                value,
                actual,
                expected,
                index: Some(at),
            },
            other => other,
        }
    }

    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            DbSnapError::SourceUnavailable { .. } => ExErrorKind::SourceUnavailable,
            DbSnapError::ColumnNotFound { .. } => ExErrorKind::ColumnNotFound,
            DbSnapError::SchemaMismatch { .. } => ExErrorKind::SchemaMismatch,
            DbSnapError::DuplicateKey { .. } => ExErrorKind::DuplicateKey,
            DbSnapError::TypeMismatch { .. } => ExErrorKind::TypeMismatch,
            DbSnapError::IndexOutOfRange { .. } => ExErrorKind::IndexOutOfRange,
            DbSnapError::SizeMismatch { .. } => ExErrorKind::SizeMismatch,
            DbSnapError::InvalidValue { .. } => ExErrorKind::InvalidValue,
            DbSnapError::InvalidState { .. } => ExErrorKind::InvalidState,
            DbSnapError::Config { .. } => ExErrorKind::Config,
            DbSnapError::Serialization { .. } => ExErrorKind::Serialization,
            DbSnapError::Io { .. } => ExErrorKind::Io,
        }
    }
}

/// Conversion from DbSnapError to the canonical ExError
impl From<DbSnapError> for ExError {
    fn from(err: DbSnapError) -> Self {
        let message = err.to_string();
        let ex = ExError::new(err.kind()).with_message(message);
        match err {
            DbSnapError::SourceUnavailable { source_name, .. } => {
                ex.with_op("build_snapshot").with_table(source_name)
            }
            DbSnapError::ColumnNotFound { table, .. } => ex.with_table(table),
            DbSnapError::SchemaMismatch { table, .. } => {
                ex.with_op("detect_changes").with_table(table)
            }
            DbSnapError::DuplicateKey { table, .. } => {
                ex.with_op("detect_changes").with_table(table)
            }
            DbSnapError::TypeMismatch {
                index: Some(index), ..
            } => ex.with_index(index),
            DbSnapError::IndexOutOfRange { index, .. } => ex.with_op("navigate").with_index(index),
            DbSnapError::Io { .. } => ex.with_op("load_config"),
            _ => ex,
        }
    }
}

impl From<serde_json::Error> for DbSnapError {
    fn from(err: serde_json::Error) -> Self {
        DbSnapError::Serialization {
            message: err.to_string(),
        }
    }
}
