//! Change detection between two snapshots.
//!
//! Rows are aligned by primary-key tuple when the snapshots have a usable
//! key, otherwise by [`UnkeyedAlignment`]. Output order within a table is
//! creations and modifications in after-row order, then deletions in
//! before-row order.

use crate::config::{DetectorConfig, UnkeyedAlignment};
use crate::diff::model::{Change, Changes};
use crate::errors::{DbSnapError, Result};
use crate::model::{Row, Snapshot};
use crate::value::Value;
use crate::{log_op_end, log_op_error, log_op_start};
use std::collections::HashMap;
use std::time::Instant;

/// Stateless change detector
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    config: DetectorConfig,
}

/// Detect changes with the default configuration.
///
/// # Errors
///
/// `DuplicateKey` and `SchemaMismatch`, see [`ChangeDetector::detect`].
pub fn detect_changes(before: Option<&Snapshot>, after: Option<&Snapshot>) -> Result<Changes> {
    ChangeDetector::default().detect(before, after)
}

impl ChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Changes between two snapshots of one source. A missing before
    /// snapshot makes every after row a creation, a missing after snapshot
    /// makes every before row a deletion.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` when two rows of one snapshot share a key tuple
    /// - `SchemaMismatch` when the snapshots name different sources or
    ///   disagree on columns or keys
    pub fn detect(&self, before: Option<&Snapshot>, after: Option<&Snapshot>) -> Result<Changes> {
        let table = after.or(before).map(|s| s.name().to_string()).unwrap_or_default();
        log_op_start!("detect_changes", table = %table);
        let start = Instant::now();

        let changes = self.detect_table(before, after).map_err(|e| {
            log_op_error!(
                "detect_changes",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                table = %table
            );
            e
        })?;

        log_op_end!(
            "detect_changes",
            duration_ms = start.elapsed().as_millis() as u64,
            table = %table,
            changes = changes.len()
        );
        Ok(Changes::new(changes))
    }

    /// Changes across several tables. Tables are matched by name
    /// (case-insensitive); results follow the after-side table order,
    /// followed by tables present only before.
    ///
    /// # Errors
    ///
    /// The first error of any per-table detection.
    pub fn detect_all(&self, before: &[Snapshot], after: &[Snapshot]) -> Result<Changes> {
        log_op_start!("detect_all", tables = after.len());
        let start = Instant::now();

        let changes = self.detect_all_impl(before, after).map_err(|e| {
            log_op_error!(
                "detect_all",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "detect_all",
            duration_ms = start.elapsed().as_millis() as u64,
            changes = changes.len()
        );
        Ok(Changes::new(changes))
    }

    fn detect_all_impl(&self, before: &[Snapshot], after: &[Snapshot]) -> Result<Vec<Change>> {
        let matching = |snapshot: &Snapshot, side: &[Snapshot]| {
            side.iter()
                .position(|other| other.source().same_source(snapshot.source()))
        };

        let mut changes = Vec::new();
        for a in after {
            let b = matching(a, before).map(|i| &before[i]);
            changes.extend(self.detect_table(b, Some(a))?);
        }
        for b in before.iter().filter(|b| matching(b, after).is_none()) {
            changes.extend(self.detect_table(Some(b), None)?);
        }
        Ok(changes)
    }

    fn detect_table(
        &self,
        before: Option<&Snapshot>,
        after: Option<&Snapshot>,
    ) -> Result<Vec<Change>> {
        match (before, after) {
            (None, None) => Ok(Vec::new()),
            (None, Some(a)) => {
                ensure_unique_keys(a)?;
                Ok(a.rows()
                    .iter()
                    .map(|row| Change::creation(a.source().clone(), row.clone()))
                    .collect())
            }
            (Some(b), None) => {
                ensure_unique_keys(b)?;
                Ok(b.rows()
                    .iter()
                    .map(|row| Change::deletion(b.source().clone(), row.clone()))
                    .collect())
            }
            (Some(b), Some(a)) => {
                ensure_compatible(b, a)?;
                if a.has_usable_primary_key() {
                    return detect_keyed(b, a);
                }
                if a.primary_key_names().is_empty() {
                    tracing::debug!(
                        component = module_path!(),
                        table = %a.name(),
                        alignment = ?self.config.unkeyed_rows,
                        "no primary key; aligning rows without key"
                    );
                } else {
                    tracing::warn!(
                        component = module_path!(),
                        table = %a.name(),
                        primary_keys = ?a.primary_key_names(),
                        alignment = ?self.config.unkeyed_rows,
                        "primary key columns are not all selected; aligning rows without key"
                    );
                }
                Ok(match self.config.unkeyed_rows {
                    UnkeyedAlignment::Positional => detect_positional(b, a),
                    UnkeyedAlignment::FullRow => detect_full_row(b, a),
                })
            }
        }
    }
}

fn same_names(left: &[String], right: &[String]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l.eq_ignore_ascii_case(r))
}

fn ensure_compatible(before: &Snapshot, after: &Snapshot) -> Result<()> {
    let mismatch = |reason: String| DbSnapError::SchemaMismatch {
        table: after.name().to_string(),
        reason,
    };
    if !before.source().same_source(after.source()) {
        return Err(mismatch(format!(
            "cannot compare {} with {}",
            before.source(),
            after.source()
        )));
    }
    if !same_names(before.column_names(), after.column_names()) {
        return Err(mismatch(format!(
            "columns {:?} before, {:?} after",
            before.column_names(),
            after.column_names()
        )));
    }
    if !same_names(before.primary_key_names(), after.primary_key_names()) {
        return Err(mismatch(format!(
            "primary keys {:?} before, {:?} after",
            before.primary_key_names(),
            after.primary_key_names()
        )));
    }
    Ok(())
}

fn format_key(key: &[&Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Rows by key tuple; `None` for a snapshot without usable key.
fn index_by_key(snapshot: &Snapshot) -> Result<Option<HashMap<Vec<&Value>, usize>>> {
    if !snapshot.has_usable_primary_key() {
        return Ok(None);
    }
    let mut index = HashMap::with_capacity(snapshot.row_count());
    for (i, row) in snapshot.rows().iter().enumerate() {
        let key = row.primary_key_values().unwrap_or_default();
        if index.contains_key(&key) {
            return Err(DbSnapError::DuplicateKey {
                table: snapshot.name().to_string(),
                key: format_key(&key),
            });
        }
        index.insert(key, i);
    }
    Ok(Some(index))
}

fn ensure_unique_keys(snapshot: &Snapshot) -> Result<()> {
    index_by_key(snapshot).map(|_| ())
}

fn differs(before: &Row, after: &Row) -> bool {
    before.values() != after.values()
}

fn detect_keyed(before: &Snapshot, after: &Snapshot) -> Result<Vec<Change>> {
    let (Some(before_index), Some(after_index)) = (index_by_key(before)?, index_by_key(after)?)
    else {
        return Ok(detect_positional(before, after));
    };
    let source = after.source();
    let mut changes = Vec::new();

    for row in after.rows() {
        let key = row.primary_key_values().unwrap_or_default();
        match before_index.get(&key).map(|&i| &before.rows()[i]) {
            Some(old) if differs(old, row) => {
                changes.push(Change::modification(source.clone(), old.clone(), row.clone()))
            }
            Some(_) => {}
            None => changes.push(Change::creation(source.clone(), row.clone())),
        }
    }
    for row in before.rows() {
        let key = row.primary_key_values().unwrap_or_default();
        if !after_index.contains_key(&key) {
            changes.push(Change::deletion(source.clone(), row.clone()));
        }
    }
    Ok(changes)
}

/// Row i before against row i after. An inserted or removed row shifts
/// every later comparison.
fn detect_positional(before: &Snapshot, after: &Snapshot) -> Vec<Change> {
    let source = after.source();
    let mut changes = Vec::new();
    for (i, row) in after.rows().iter().enumerate() {
        match before.rows().get(i) {
            Some(old) if differs(old, row) => {
                changes.push(Change::modification(source.clone(), old.clone(), row.clone()))
            }
            Some(_) => {}
            None => changes.push(Change::creation(source.clone(), row.clone())),
        }
    }
    for row in before.rows().iter().skip(after.row_count()) {
        changes.push(Change::deletion(source.clone(), row.clone()));
    }
    changes
}

/// Rows as a multiset of full-row values; never yields modifications.
fn detect_full_row(before: &Snapshot, after: &Snapshot) -> Vec<Change> {
    fn counts(snapshot: &Snapshot) -> HashMap<&[Value], usize> {
        let mut counts = HashMap::new();
        for row in snapshot.rows() {
            *counts.entry(row.values()).or_insert(0) += 1;
        }
        counts
    }
    fn unmatched<'a>(rows: &'a [Row], mut other: HashMap<&[Value], usize>) -> Vec<&'a Row> {
        rows.iter()
            .filter(|row| match other.get_mut(row.values()) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    false
                }
                _ => true,
            })
            .collect()
    }

    let source = after.source();
    let created = unmatched(after.rows(), counts(before));
    let deleted = unmatched(before.rows(), counts(after));
    created
        .into_iter()
        .map(|row| Change::creation(source.clone(), row.clone()))
        .chain(
            deleted
                .into_iter()
                .map(|row| Change::deletion(source.clone(), row.clone())),
        )
        .collect()
}
