//! Change recording between a start point and an end point.
//!
//! ```ignore
//! let mut recorder = ChangeRecorder::new(ChangeScope::Schema);
//! recorder.set_start_point_now(&source)?;
//! // ... exercise the code under test ...
//! recorder.set_end_point_now(&source)?;
//! let changes = recorder.changes()?;
//! ```

use crate::config::DetectorConfig;
use crate::diff::{ChangeDetector, Changes};
use crate::errors::{DbSnapError, Result};
use crate::model::{Snapshot, SourceRef};
use crate::reader::{build_schema_snapshot, build_snapshot, DataSource};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// What a recorder snapshots at each point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeScope {
    /// The listed tables or requests
    Sources(Vec<SourceRef>),
    /// Every table the data source lists
    Schema,
    /// One request, keyed by caller-supplied primary-key names
    Request {
        sql: String,
        primary_key_names: Vec<String>,
    },
}

#[derive(Debug)]
pub struct ChangeRecorder {
    scope: ChangeScope,
    detector: ChangeDetector,
    start: Option<Vec<Snapshot>>,
    end: Option<Vec<Snapshot>>,
    source_description: Option<String>,
}

impl ChangeRecorder {
    pub fn new(scope: ChangeScope) -> Self {
        Self::with_config(scope, DetectorConfig::default())
    }

    pub fn with_config(scope: ChangeScope, config: DetectorConfig) -> Self {
        Self {
            scope,
            detector: ChangeDetector::new(config),
            start: None,
            end: None,
            source_description: None,
        }
    }

    pub fn scope(&self) -> &ChangeScope {
        &self.scope
    }

    pub fn has_start_point(&self) -> bool {
        self.start.is_some()
    }

    pub fn has_end_point(&self) -> bool {
        self.end.is_some()
    }

    /// Snapshot the scope now as the start point. Setting it again replaces
    /// the previous start point.
    ///
    /// # Errors
    ///
    /// Any error of the snapshot reader.
    pub fn set_start_point_now<D: DataSource + ?Sized>(&mut self, source: &D) -> Result<()> {
        let snapshots = self.record_point("set_start_point", source)?;
        self.source_description = Some(source.description());
        self.start = Some(snapshots);
        Ok(())
    }

    /// Snapshot the scope now as the end point.
    ///
    /// # Errors
    ///
    /// Any error of the snapshot reader.
    pub fn set_end_point_now<D: DataSource + ?Sized>(&mut self, source: &D) -> Result<()> {
        let snapshots = self.record_point("set_end_point", source)?;
        self.end = Some(snapshots);
        Ok(())
    }

    /// Changes between the start and end points.
    ///
    /// # Errors
    ///
    /// `InvalidState` before both points are set, then any detector error.
    pub fn changes(&self) -> Result<Changes> {
        let start = self.start.as_ref().ok_or_else(|| DbSnapError::InvalidState {
            reason: "start point must be set before changes are computed".to_string(),
        })?;
        let end = self.end.as_ref().ok_or_else(|| DbSnapError::InvalidState {
            reason: "end point must be set before changes are computed".to_string(),
        })?;
        let changes = self.detector.detect_all(start, end)?;
        Ok(match &self.source_description {
            Some(description) => changes.with_source(description.clone()),
            None => changes,
        })
    }

    fn record_point<D: DataSource + ?Sized>(&self, op: &str, source: &D) -> Result<Vec<Snapshot>> {
        log_op_start!(op, source = %source.description());
        let start = Instant::now();

        let snapshots = self.snapshot_scope(source).map_err(|e| {
            log_op_error!(op, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            tables = snapshots.len()
        );
        Ok(snapshots)
    }

    fn snapshot_scope<D: DataSource + ?Sized>(&self, source: &D) -> Result<Vec<Snapshot>> {
        match &self.scope {
            ChangeScope::Sources(refs) => refs.iter().map(|r| build_snapshot(source, r)).collect(),
            ChangeScope::Schema => build_schema_snapshot(source),
            ChangeScope::Request {
                sql,
                primary_key_names,
            } => {
                let snapshot = build_snapshot(source, &SourceRef::request(sql.clone()))?;
                let snapshot = if primary_key_names.is_empty() {
                    snapshot
                } else {
                    snapshot.with_primary_keys(primary_key_names.clone())?
                };
                Ok(vec![snapshot])
            }
        }
    }
}
