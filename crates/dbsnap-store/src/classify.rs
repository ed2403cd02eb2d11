//! Cell classification
//!
//! SQLite stores five storage classes; the declared column type carries
//! the rest of the meaning. A cell is classified from both: the storage
//! class says what was stored and the declared kind says how to read it.

use chrono::{NaiveDateTime, Timelike};
use dbsnap_core::{DateTimeValue, DateValue, Number, RawCell, TimeValue};
use rusqlite::types::ValueRef;

/// Semantic kind of a column, from its declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    Boolean,
    Date,
    Time,
    DateTime,
    Decimal,
    /// Anything else, storage class decides
    Plain,
}

impl DeclaredKind {
    /// Classify a declared type such as `VARCHAR(20)` or `DATETIME`.
    ///
    /// Expressions in a request have no declared type and read as `Plain`.
    pub fn from_decl_type(decl: Option<&str>) -> Self {
        let Some(decl) = decl else {
            return DeclaredKind::Plain;
        };
        let decl = decl.trim().to_ascii_uppercase();
        if decl.starts_with("BOOL") {
            DeclaredKind::Boolean
        } else if decl.starts_with("DATETIME") || decl.starts_with("TIMESTAMP") {
            DeclaredKind::DateTime
        } else if decl.starts_with("DATE") {
            DeclaredKind::Date
        } else if decl.starts_with("TIME") {
            DeclaredKind::Time
        } else if decl.starts_with("DECIMAL") || decl.starts_with("NUMERIC") {
            DeclaredKind::Decimal
        } else {
            DeclaredKind::Plain
        }
    }

    fn is_temporal(self) -> bool {
        matches!(
            self,
            DeclaredKind::Date | DeclaredKind::Time | DeclaredKind::DateTime
        )
    }
}

/// Translate one SQLite cell into a [`RawCell`]
pub fn classify(cell: ValueRef<'_>, kind: DeclaredKind) -> RawCell {
    match cell {
        ValueRef::Null => RawCell::Null,
        ValueRef::Integer(i) => classify_integer(i, kind),
        ValueRef::Real(f) if kind.is_temporal() => RawCell::Other(f.to_string()),
        ValueRef::Real(f) => RawCell::Real(f),
        ValueRef::Text(bytes) => classify_text(String::from_utf8_lossy(bytes).into_owned(), kind),
        ValueRef::Blob(bytes) => RawCell::Bytes(bytes.to_vec()),
    }
}

fn classify_integer(i: i64, kind: DeclaredKind) -> RawCell {
    match kind {
        DeclaredKind::Boolean => RawCell::Bool(i != 0),
        // Integers in date columns are Unix seconds
        DeclaredKind::Date | DeclaredKind::DateTime => {
            match chrono::DateTime::from_timestamp(i, 0) {
                Some(instant) => {
                    let naive = instant.naive_utc();
                    if kind == DeclaredKind::Date && naive.time().num_seconds_from_midnight() == 0 {
                        RawCell::Date(naive.date())
                    } else {
                        RawCell::DateTime(naive)
                    }
                }
                None => RawCell::Other(i.to_string()),
            }
        }
        DeclaredKind::Time => RawCell::Other(i.to_string()),
        DeclaredKind::Decimal | DeclaredKind::Plain => RawCell::Integer(i),
    }
}

fn classify_text(text: String, kind: DeclaredKind) -> RawCell {
    match kind {
        DeclaredKind::Boolean => match text.trim().to_ascii_lowercase().as_str() {
            "true" => RawCell::Bool(true),
            "false" => RawCell::Bool(false),
            _ => RawCell::Text(text),
        },
        DeclaredKind::Date => match DateValue::parse(text.trim()) {
            Ok(date) => RawCell::Date(date.as_naive()),
            Err(_) => match DateTimeValue::parse(text.trim()) {
                Ok(dt) => RawCell::DateTime(naive_date_time(dt)),
                Err(_) => RawCell::Text(text),
            },
        },
        DeclaredKind::Time => match TimeValue::parse(text.trim()) {
            Ok(time) => RawCell::Time(time.as_naive()),
            Err(_) => RawCell::Text(text),
        },
        DeclaredKind::DateTime => match DateTimeValue::parse(text.trim()) {
            Ok(dt) => RawCell::DateTime(naive_date_time(dt)),
            Err(_) => RawCell::Text(text),
        },
        DeclaredKind::Decimal => match Number::parse(text.trim()) {
            Ok(_) => RawCell::Decimal(text.trim().to_string()),
            Err(_) => RawCell::Text(text),
        },
        DeclaredKind::Plain => RawCell::Text(text),
    }
}

fn naive_date_time(dt: DateTimeValue) -> NaiveDateTime {
    NaiveDateTime::new(dt.date().as_naive(), dt.time().as_naive())
}
