use crate::errors::{DbSnapError, Result};
use crate::value::Value;
use serde::Serialize;

/// A named column of a snapshot: one value per row, in row order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

/// First position where actual and expected values disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueMismatch {
    pub index: usize,
    pub actual: Value,
    pub expected: Value,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name identity
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, len)`.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(DbSnapError::IndexOutOfRange {
            index,
            size: self.values.len(),
        })
    }

    /// Compare the column to an expected list of values.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` when the lengths differ; `TypeMismatch` carrying the
    /// row index when an expectation has an incompatible type.
    pub fn first_mismatch(&self, expected: &[Value]) -> Result<Option<ValueMismatch>> {
        first_mismatch(&self.values, expected)
    }
}

pub(crate) fn first_mismatch(
    actual: &[Value],
    expected: &[Value],
) -> Result<Option<ValueMismatch>> {
    if actual.len() != expected.len() {
        return Err(DbSnapError::SizeMismatch {
            actual: actual.len(),
            expected: expected.len(),
        });
    }
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        if !a.is_equal_to(e).map_err(|err| err.at_index(index))? {
            return Ok(Some(ValueMismatch {
                index,
                actual: a.clone(),
                expected: e.clone(),
            }));
        }
    }
    Ok(None)
}
