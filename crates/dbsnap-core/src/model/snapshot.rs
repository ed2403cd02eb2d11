use super::column::Column;
use super::row::{position_of, Row, RowLayout};
use super::source::{SourceDescription, SourceKind};
use crate::errors::{DbSnapError, Result};
use crate::value::Value;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One fully materialized, normalized capture of a tabular source
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    source: SourceDescription,
    layout: Arc<RowLayout>,
    rows: Vec<Row>,
}

impl Snapshot {
    /// Assemble a snapshot from normalized rows.
    ///
    /// Declared primary keys are kept even when a key column is not among
    /// `column_names`; such a snapshot simply has no usable key. A request
    /// may repeat a column label; lookups by name return the first match.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for a table listing a column twice or a row whose
    /// width differs from the column count.
    pub fn new(
        source: SourceDescription,
        column_names: Vec<String>,
        primary_key_names: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let table_columns = match source.kind {
            SourceKind::Table => column_names.as_slice(),
            SourceKind::Request => &[],
        };
        for (i, name) in table_columns.iter().enumerate() {
            if position_of(&table_columns[..i], name).is_some() {
                return Err(DbSnapError::SchemaMismatch {
                    table: source.name.clone(),
                    reason: format!("column <{}> is listed twice", name),
                });
            }
        }
        let width = column_names.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DbSnapError::SchemaMismatch {
                table: source.name.clone(),
                reason: format!("row {} has {} values for {} columns", i, row.len(), width),
            });
        }

        let layout = Arc::new(RowLayout::new(
            source.name.clone(),
            column_names,
            primary_key_names,
        ));
        let rows = rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&layout), values))
            .collect();
        Ok(Self {
            source,
            layout,
            rows,
        })
    }

    /// Replace the primary-key names, e.g. for a request whose keys the
    /// caller knows.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` when a key is not one of the snapshot's columns.
    pub fn with_primary_keys(self, primary_key_names: Vec<String>) -> Result<Self> {
        if let Some(missing) = primary_key_names
            .iter()
            .find(|pk| self.layout.index_of(pk).is_none())
        {
            return Err(DbSnapError::ColumnNotFound {
                table: self.source.name.clone(),
                column: missing.clone(),
            });
        }
        let layout = Arc::new(RowLayout::new(
            self.source.name.clone(),
            self.layout.column_names().to_vec(),
            primary_key_names,
        ));
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.relayout(Arc::clone(&layout)))
            .collect();
        Ok(Self {
            source: self.source,
            layout,
            rows,
        })
    }

    pub fn source(&self) -> &SourceDescription {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn column_names(&self) -> &[String] {
        self.layout.column_names()
    }

    pub fn primary_key_names(&self) -> &[String] {
        self.layout.primary_key_names()
    }

    /// Key column positions; `None` when rows cannot be keyed.
    pub fn primary_key_indexes(&self) -> Option<&[usize]> {
        self.layout.primary_key_indexes()
    }

    pub fn has_usable_primary_key(&self) -> bool {
        self.layout.primary_key_indexes().is_some()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.layout.column_names().len()
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, row_count)`.
    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(DbSnapError::IndexOutOfRange {
            index,
            size: self.rows.len(),
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.layout.index_of(name)
    }

    /// Materialize the column at `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, column_count)`.
    pub fn column(&self, index: usize) -> Result<Column> {
        let name = self
            .layout
            .column_names()
            .get(index)
            .ok_or(DbSnapError::IndexOutOfRange {
                index,
                size: self.column_count(),
            })?;
        let values = self
            .rows
            .iter()
            .filter_map(|row| row.values().get(index).cloned())
            .collect();
        Ok(Column::new(name.clone(), values))
    }

    /// Materialize a column by name, case-insensitively; the first match
    /// wins when a request repeats a label.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for an unknown name.
    pub fn column_named(&self, name: &str) -> Result<Column> {
        let index = self
            .column_index(name)
            .ok_or_else(|| DbSnapError::ColumnNotFound {
                table: self.source.name.clone(),
                column: name.to_string(),
            })?;
        self.column(index)
    }

    pub fn columns(&self) -> Vec<Column> {
        (0..self.column_count())
            .filter_map(|i| self.column(i).ok())
            .collect()
    }

    /// # Errors
    ///
    /// `Serialization` if the encoder fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Snapshot", 4)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("columns", self.column_names())?;
        state.serialize_field("primary_keys", self.primary_key_names())?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}
