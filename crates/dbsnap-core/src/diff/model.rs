//! Change records and change sequences.

use crate::errors::{DbSnapError, Result};
use crate::model::column::{first_mismatch, ValueMismatch};
use crate::model::{Row, SourceDescription};
use crate::value::Value;
use serde::Serialize;
use std::sync::Arc;

/// Classification of a difference between two aligned rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Creation,
    Modification,
    Deletion,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeType::Creation => "CREATION",
            ChangeType::Modification => "MODIFICATION",
            ChangeType::Deletion => "DELETION",
        };
        f.write_str(name)
    }
}

/// One classified row difference
///
/// A creation has no row before, a deletion no row after, and a
/// modification has both rows differing in at least one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    change_type: ChangeType,
    source: SourceDescription,
    row_before: Option<Row>,
    row_after: Option<Row>,
}

impl Change {
    pub(crate) fn creation(source: SourceDescription, after: Row) -> Self {
        Self {
            change_type: ChangeType::Creation,
            source,
            row_before: None,
            row_after: Some(after),
        }
    }

    pub(crate) fn deletion(source: SourceDescription, before: Row) -> Self {
        Self {
            change_type: ChangeType::Deletion,
            source,
            row_before: Some(before),
            row_after: None,
        }
    }

    pub(crate) fn modification(source: SourceDescription, before: Row, after: Row) -> Self {
        Self {
            change_type: ChangeType::Modification,
            source,
            row_before: Some(before),
            row_after: Some(after),
        }
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn source(&self) -> &SourceDescription {
        &self.source
    }

    pub fn table_name(&self) -> &str {
        &self.source.name
    }

    pub fn row_before(&self) -> Option<&Row> {
        self.row_before.as_ref()
    }

    pub fn row_after(&self) -> Option<&Row> {
        self.row_after.as_ref()
    }

    /// The after row, or the before row for a deletion
    fn reference_row(&self) -> Option<&Row> {
        self.row_after.as_ref().or(self.row_before.as_ref())
    }

    pub fn column_names(&self) -> &[String] {
        self.reference_row().map(Row::column_names).unwrap_or(&[])
    }

    /// Declared key names, reported even when a key column was filtered out
    pub fn primary_key_names(&self) -> &[String] {
        self.reference_row()
            .map(Row::primary_key_names)
            .unwrap_or(&[])
    }

    /// Key values of the row; empty when the source has no usable key
    pub fn primary_key_values(&self) -> Vec<&Value> {
        self.reference_row()
            .and_then(|r| r.primary_key_values())
            .unwrap_or_default()
    }

    /// Columns whose value differs; every column for a creation or deletion.
    pub fn modified_column_indexes(&self) -> Vec<usize> {
        match (&self.row_before, &self.row_after) {
            (Some(before), Some(after)) => before
                .values()
                .iter()
                .zip(after.values())
                .enumerate()
                .filter(|(_, (b, a))| b != a)
                .map(|(i, _)| i)
                .collect(),
            _ => (0..self.column_names().len()).collect(),
        }
    }

    pub fn modified_column_names(&self) -> Vec<&str> {
        let names = self.column_names();
        self.modified_column_indexes()
            .into_iter()
            .filter_map(|i| names.get(i).map(String::as_str))
            .collect()
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, column count)`.
    pub fn column_name(&self, index: usize) -> Result<&str> {
        let names = self.column_names();
        names
            .get(index)
            .map(String::as_str)
            .ok_or(DbSnapError::IndexOutOfRange {
                index,
                size: names.len(),
            })
    }

    /// The column at `index` with its values at the start and end points.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, column count)`.
    pub fn column_values(&self, index: usize) -> Result<ChangeColumn> {
        let name = self.column_name(index)?.to_string();
        let value_of = |row: Option<&Row>| row.and_then(|r| r.values().get(index)).cloned();
        Ok(ChangeColumn {
            name,
            before: value_of(self.row_before()),
            after: value_of(self.row_after()),
        })
    }
}

/// One column of a change with its start and end point values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeColumn {
    pub name: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl ChangeColumn {
    pub fn is_modified(&self) -> bool {
        self.before != self.after
    }

    /// Check both point values. A missing row reads as NULL. The mismatch
    /// index is 0 for the start point and 1 for the end point.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when an expectation cannot be compared with its value.
    pub fn first_mismatch(
        &self,
        expected_before: &Value,
        expected_after: &Value,
    ) -> Result<Option<ValueMismatch>> {
        let actual = [
            self.before.clone().unwrap_or(Value::Null),
            self.after.clone().unwrap_or(Value::Null),
        ];
        first_mismatch(&actual, &[expected_before.clone(), expected_after.clone()])
    }
}

/// Ordered, immutable sequence of changes
///
/// Filtering yields a new view sharing the same change records. The data
/// source description is carried for display only and is ignored by
/// equality.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Changes {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    changes: Vec<Arc<Change>>,
}

impl Changes {
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            source: None,
            changes: changes.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_shared(source: Option<String>, changes: Vec<Arc<Change>>) -> Self {
        Self { source, changes }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().map(|c| &**c)
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, len)`.
    pub fn at(&self, index: usize) -> Result<&Change> {
        self.changes
            .get(index)
            .map(|c| &**c)
            .ok_or(DbSnapError::IndexOutOfRange {
                index,
                size: self.changes.len(),
            })
    }

    /// Shared handle on the change at `index`
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, len)`.
    pub fn shared(&self, index: usize) -> Result<Arc<Change>> {
        self.changes
            .get(index)
            .cloned()
            .ok_or(DbSnapError::IndexOutOfRange {
                index,
                size: self.changes.len(),
            })
    }

    /// View restricted to a change type and/or a table (case-insensitive)
    pub fn filter(&self, change_type: Option<ChangeType>, table: Option<&str>) -> Changes {
        let changes = self
            .changes
            .iter()
            .filter(|c| change_type.map_or(true, |t| c.change_type == t))
            .filter(|c| table.map_or(true, |t| c.table_name().eq_ignore_ascii_case(t)))
            .cloned()
            .collect();
        Self::from_shared(self.source.clone(), changes)
    }

    pub fn of_type(&self, change_type: ChangeType) -> Changes {
        self.filter(Some(change_type), None)
    }

    pub fn on_table(&self, table: &str) -> Changes {
        self.filter(None, Some(table))
    }

    pub fn count_of(&self, change_type: ChangeType) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .count()
    }

    /// Pretty-printed JSON of the whole sequence
    ///
    /// # Errors
    ///
    /// `Serialization` if the encoder fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl PartialEq for Changes {
    fn eq(&self, other: &Self) -> bool {
        self.changes == other.changes
    }
}

impl Eq for Changes {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;

    fn rows(values: Vec<Vec<Value>>) -> Vec<Row> {
        Snapshot::new(
            SourceDescription::table("movie"),
            vec!["id".to_string(), "title".to_string()],
            vec!["id".to_string()],
            values,
        )
        .unwrap()
        .rows()
        .to_vec()
    }

    fn sample() -> Changes {
        let r = rows(vec![
            vec![Value::from(1), Value::from("Alien")],
            vec![Value::from(1), Value::from("Aliens")],
            vec![Value::from(2), Value::from("Brazil")],
        ]);
        Changes::new(vec![
            Change::modification(SourceDescription::table("movie"), r[0].clone(), r[1].clone()),
            Change::creation(SourceDescription::table("movie"), r[2].clone()),
            Change::deletion(SourceDescription::table("actor"), r[0].clone()),
        ])
    }

    #[test]
    fn test_modified_columns() {
        let changes = sample();
        assert_eq!(changes.at(0).unwrap().modified_column_names(), vec!["title"]);
        assert_eq!(changes.at(1).unwrap().modified_column_indexes(), vec![0, 1]);
    }

    #[test]
    fn test_column_values_of_a_change() {
        let changes = sample();
        let title = changes.at(0).unwrap().column_values(1).unwrap();
        assert!(title.is_modified());
        assert_eq!(
            title
                .first_mismatch(&Value::from("Alien"), &Value::from("Aliens"))
                .unwrap(),
            None
        );

        let created = changes.at(1).unwrap().column_values(0).unwrap();
        assert_eq!(created.before, None);
        let mismatch = created
            .first_mismatch(&Value::Null, &Value::from(3))
            .unwrap()
            .unwrap();
        assert_eq!(mismatch.index, 1);
    }

    #[test]
    fn test_filter_shares_records_and_ignores_table_case() {
        let changes = sample();
        let movie = changes.on_table("MOVIE");
        assert_eq!(movie.len(), 2);
        assert!(Arc::ptr_eq(&movie.shared(0).unwrap(), &changes.shared(0).unwrap()));
        assert_eq!(changes.of_type(ChangeType::Deletion).len(), 1);
        assert_eq!(
            changes.filter(Some(ChangeType::Creation), Some("actor")).len(),
            0
        );
    }

    #[test]
    fn test_at_out_of_range() {
        assert_eq!(
            sample().at(3).unwrap_err(),
            DbSnapError::IndexOutOfRange { index: 3, size: 3 }
        );
    }

    #[test]
    fn test_equality_ignores_source() {
        assert_eq!(sample().with_source("a.db"), sample().with_source("b.db"));
    }

    #[test]
    fn test_serializes_change_type() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["changes"][0]["change_type"], "MODIFICATION");
        assert_eq!(json["changes"][1]["row_before"], serde_json::Value::Null);
        assert_eq!(json["changes"][1]["row_after"]["title"]["value"], "Brazil");
    }
}
