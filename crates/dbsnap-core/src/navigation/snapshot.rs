use crate::errors::{DbSnapError, Result};
use crate::model::{Column, Row, Snapshot};

/// Cursor navigation over the columns and rows of one snapshot
#[derive(Debug, Clone)]
pub struct SnapshotNavigator<'a> {
    snapshot: &'a Snapshot,
    column_cursor: usize,
    row_cursor: usize,
}

impl<'a> SnapshotNavigator<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            column_cursor: 0,
            row_cursor: 0,
        }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn column_cursor(&self) -> usize {
        self.column_cursor
    }

    pub fn row_cursor(&self) -> usize {
        self.row_cursor
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` once every column has been visited.
    pub fn next_column(&mut self) -> Result<Column> {
        self.column_at(self.column_cursor)
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, column count)`.
    pub fn column_at(&mut self, index: usize) -> Result<Column> {
        let column = self.snapshot.column(index)?;
        self.column_cursor = index + 1;
        Ok(column)
    }

    /// Look a column up by name (case-insensitive); the cursor moves past it.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for an unknown name.
    pub fn column_named(&mut self, name: &str) -> Result<Column> {
        let index = self
            .snapshot
            .column_index(name)
            .ok_or_else(|| DbSnapError::ColumnNotFound {
                table: self.snapshot.name().to_string(),
                column: name.to_string(),
            })?;
        self.column_at(index)
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` once every row has been visited.
    pub fn next_row(&mut self) -> Result<&'a Row> {
        self.row_at(self.row_cursor)
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, row count)`.
    pub fn row_at(&mut self, index: usize) -> Result<&'a Row> {
        let row = self.snapshot.row(index)?;
        self.row_cursor = index + 1;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceDescription;
    use crate::value::Value;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            SourceDescription::table("actor"),
            vec!["id".to_string(), "name".to_string(), "birth".to_string()],
            vec!["id".to_string()],
            vec![
                vec![Value::from(1), Value::from("Weaver"), Value::Null],
                vec![Value::from(2), Value::from("Phoenix"), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_name_lookup_moves_column_cursor() {
        let snapshot = snapshot();
        let mut nav = SnapshotNavigator::new(&snapshot);
        assert_eq!(nav.column_named("NAME").unwrap().name(), "name");
        assert_eq!(nav.next_column().unwrap().name(), "birth");
        assert_eq!(
            nav.next_column().unwrap_err(),
            DbSnapError::IndexOutOfRange { index: 3, size: 3 }
        );
        assert_eq!(nav.column_cursor(), 3);
    }

    #[test]
    fn test_rows_and_columns_have_separate_cursors() {
        let snapshot = snapshot();
        let mut nav = SnapshotNavigator::new(&snapshot);
        nav.column_at(2).unwrap();
        assert_eq!(nav.next_row().unwrap().value(0).unwrap(), &Value::from(1));
        assert_eq!(nav.next_row().unwrap().value(1).unwrap(), &Value::from("Phoenix"));
        assert!(nav.next_row().is_err());
        assert!(matches!(
            nav.column_named("age"),
            Err(DbSnapError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_looking_back_rewinds_cursor() {
        let snapshot = snapshot();
        let mut nav = SnapshotNavigator::new(&snapshot);
        nav.row_at(1).unwrap();
        assert_eq!(nav.row_at(0).unwrap().value(0).unwrap(), &Value::from(1));
        assert_eq!(nav.row_cursor(), 1);
        assert_eq!(nav.next_row().unwrap().value(0).unwrap(), &Value::from(2));

        nav.column_at(2).unwrap();
        nav.column_named("id").unwrap();
        assert_eq!(nav.next_column().unwrap().name(), "name");
    }
}
