use crate::errors::{DbSnapError, Result};
use serde::Serialize;

/// Kind of tabular source a snapshot was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Table,
    Request,
}

/// Display identity of a source: a table name or the SQL of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescription {
    pub kind: SourceKind,
    pub name: String,
}

impl SourceDescription {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Table,
            name: name.into(),
        }
    }

    pub fn request(sql: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Request,
            name: sql.into(),
        }
    }

    /// Same logical source: table names match case-insensitively, request
    /// text must match exactly.
    pub fn same_source(&self, other: &SourceDescription) -> bool {
        self.kind == other.kind
            && match self.kind {
                SourceKind::Table => self.name.eq_ignore_ascii_case(&other.name),
                SourceKind::Request => self.name == other.name,
            }
    }
}

impl std::fmt::Display for SourceDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SourceKind::Table => write!(f, "{} table", self.name),
            SourceKind::Request => write!(f, "'{}' request", self.name),
        }
    }
}

/// Column selection applied to a table source
///
/// With an inclusion list the output follows that list; excluded names are
/// then removed. Names match case-insensitively and are reported in the
/// source's casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    pub include: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

impl ColumnFilter {
    /// Every column, in source order
    pub fn all() -> Self {
        Self::default()
    }

    pub fn including<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Some(names.into_iter().map(Into::into).collect()),
            exclude: Vec::new(),
        }
    }

    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: None,
            exclude: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.include.is_none() && self.exclude.is_empty()
    }

    /// Resolve the filter against the columns a table declares.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` when an included or excluded name is not declared.
    pub fn apply(&self, table: &str, available: &[String]) -> Result<Vec<String>> {
        let resolve = |name: &String| -> Result<String> {
            available
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(name))
                .cloned()
                .ok_or_else(|| DbSnapError::ColumnNotFound {
                    table: table.to_string(),
                    column: name.clone(),
                })
        };

        let mut selected = match &self.include {
            Some(names) => {
                let mut out: Vec<String> = Vec::with_capacity(names.len());
                for name in names {
                    let resolved = resolve(name)?;
                    if !out.contains(&resolved) {
                        out.push(resolved);
                    }
                }
                out
            }
            None => available.to_vec(),
        };

        for name in &self.exclude {
            let resolved = resolve(name)?;
            selected.retain(|c| *c != resolved);
        }
        Ok(selected)
    }
}

/// What to read from a data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Table { name: String, columns: ColumnFilter },
    Request { sql: String },
}

impl SourceRef {
    pub fn table(name: impl Into<String>) -> Self {
        SourceRef::Table {
            name: name.into(),
            columns: ColumnFilter::all(),
        }
    }

    pub fn table_with(name: impl Into<String>, columns: ColumnFilter) -> Self {
        SourceRef::Table {
            name: name.into(),
            columns,
        }
    }

    pub fn request(sql: impl Into<String>) -> Self {
        SourceRef::Request { sql: sql.into() }
    }

    pub fn description(&self) -> SourceDescription {
        match self {
            SourceRef::Table { name, .. } => SourceDescription::table(name.clone()),
            SourceRef::Request { sql } => SourceDescription::request(sql.clone()),
        }
    }
}
