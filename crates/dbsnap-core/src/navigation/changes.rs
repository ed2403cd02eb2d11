use crate::diff::{Change, ChangeType, Changes};
use crate::errors::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Composite cache and cursor key: optional change type plus optional
/// table name, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    change_type: Option<ChangeType>,
    table: Option<String>,
}

impl FilterKey {
    pub fn new(change_type: Option<ChangeType>, table: Option<&str>) -> Self {
        Self {
            change_type,
            table: table.map(str::to_lowercase),
        }
    }

    pub fn change_type(&self) -> Option<ChangeType> {
        self.change_type
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

/// Navigates a [`Changes`] sequence by type and table
///
/// Filtered views and point lookups are memoized per navigator; caching
/// never changes what a lookup returns. An unknown table or type yields an
/// empty view rather than an error, so index access into it fails with
/// `IndexOutOfRange` of size 0.
#[derive(Debug)]
pub struct ChangesNavigator {
    changes: Changes,
    cursors: HashMap<FilterKey, usize>,
    views: HashMap<FilterKey, Changes>,
    points: HashMap<(FilterKey, usize), Arc<Change>>,
}

impl ChangesNavigator {
    pub fn new(changes: Changes) -> Self {
        Self {
            changes,
            cursors: HashMap::new(),
            views: HashMap::new(),
            points: HashMap::new(),
        }
    }

    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    fn cached_view(&mut self, key: &FilterKey) -> &Changes {
        let changes = &self.changes;
        self.views
            .entry(key.clone())
            .or_insert_with(|| changes.filter(key.change_type, key.table.as_deref()))
    }

    /// The sub-sequence matching the filter
    pub fn view(&mut self, change_type: Option<ChangeType>, table: Option<&str>) -> Changes {
        let key = FilterKey::new(change_type, table);
        self.cached_view(&key).clone()
    }

    /// The change at `index` within the filter; moves the filter's cursor
    /// to `index + 1`, backwards too.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside `[0, view size)`; the cursor is unchanged.
    pub fn at(
        &mut self,
        change_type: Option<ChangeType>,
        table: Option<&str>,
        index: usize,
    ) -> Result<Arc<Change>> {
        let key = FilterKey::new(change_type, table);
        self.fetch(key, index)
    }

    /// The change under the filter's cursor.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` once the filter is exhausted.
    pub fn next(
        &mut self,
        change_type: Option<ChangeType>,
        table: Option<&str>,
    ) -> Result<Arc<Change>> {
        let key = FilterKey::new(change_type, table);
        let index = self.cursors.get(&key).copied().unwrap_or(0);
        self.fetch(key, index)
    }

    /// Index the next cursor fetch would use
    pub fn cursor(&self, change_type: Option<ChangeType>, table: Option<&str>) -> usize {
        self.cursors
            .get(&FilterKey::new(change_type, table))
            .copied()
            .unwrap_or(0)
    }

    fn fetch(&mut self, key: FilterKey, index: usize) -> Result<Arc<Change>> {
        let point_key = (key, index);
        let change = match self.points.get(&point_key) {
            Some(change) => Arc::clone(change),
            None => {
                let change = self.cached_view(&point_key.0).shared(index)?;
                self.points.insert(point_key.clone(), Arc::clone(&change));
                change
            }
        };
        self.cursors.insert(point_key.0, index + 1);
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::detect_changes;
    use crate::errors::DbSnapError;
    use crate::model::{Snapshot, SourceDescription};
    use crate::value::Value;

    fn changes() -> Changes {
        let table = |rows: Vec<Vec<Value>>| {
            Snapshot::new(
                SourceDescription::table("movie"),
                vec!["id".to_string()],
                vec!["id".to_string()],
                rows,
            )
            .unwrap()
        };
        let before = table(vec![vec![Value::from(1)]]);
        let after = table(vec![vec![Value::from(2)], vec![Value::from(3)]]);
        detect_changes(Some(&before), Some(&after)).unwrap()
    }

    #[test]
    fn test_indexed_fetch_repositions_cursor() {
        let mut nav = ChangesNavigator::new(changes());
        let first = nav.at(None, None, 1).unwrap();
        assert_eq!(nav.cursor(None, None), 2);
        nav.at(None, None, 0).unwrap();
        assert_eq!(nav.cursor(None, None), 1);
        // Cache hits reposition the cursor too
        let again = nav.next(None, None).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(nav.cursor(None, None), 2);
    }

    #[test]
    fn test_failed_fetch_keeps_cursor() {
        let mut nav = ChangesNavigator::new(changes());
        nav.next(None, None).unwrap();
        assert_eq!(
            nav.at(None, None, 7).unwrap_err(),
            DbSnapError::IndexOutOfRange { index: 7, size: 3 }
        );
        assert_eq!(nav.cursor(None, None), 1);
    }

    #[test]
    fn test_unknown_table_is_an_empty_view() {
        let mut nav = ChangesNavigator::new(changes());
        assert!(nav.view(None, Some("actor")).is_empty());
        assert_eq!(
            nav.next(None, Some("actor")).unwrap_err(),
            DbSnapError::IndexOutOfRange { index: 0, size: 0 }
        );
    }

    #[test]
    fn test_filter_keys_ignore_table_case() {
        assert_eq!(
            FilterKey::new(None, Some("MOVIE")),
            FilterKey::new(None, Some("movie"))
        );
        let mut nav = ChangesNavigator::new(changes());
        nav.next(Some(ChangeType::Creation), Some("Movie")).unwrap();
        assert_eq!(nav.cursor(Some(ChangeType::Creation), Some("movie")), 1);
        assert_eq!(nav.cursor(Some(ChangeType::Creation), None), 0);
    }
}
