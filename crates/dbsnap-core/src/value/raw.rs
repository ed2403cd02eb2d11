//! Raw cells as delivered by a data-source collaborator, and their
//! normalization into [`Value`].

use super::{DateTimeValue, DateValue, Number, TimeValue, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Driver-side representation of one cell
///
/// Collaborators translate their native types into this closed set; nothing
/// driver-specific crosses into the value model.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// Fixed-point text as stored by the driver (`DECIMAL`/`NUMERIC`)
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Any driver-native value without a semantic mapping, rendered as text
    Other(String),
}

/// Classify a raw cell into its semantic [`Value`]
pub fn normalize(cell: RawCell) -> Value {
    match cell {
        RawCell::Null => Value::Null,
        RawCell::Bool(b) => Value::Boolean(b),
        RawCell::Integer(i) => Value::Number(Number::from(i)),
        RawCell::Real(f) => match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => Value::NotIdentified(f.to_string()),
        },
        RawCell::Decimal(text) => match Number::parse(&text) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::NotIdentified(text),
        },
        RawCell::Text(s) => Value::Text(s),
        RawCell::Bytes(b) => Value::Bytes(b),
        RawCell::Date(d) => Value::Date(DateValue::from(d)),
        RawCell::Time(t) => Value::Time(TimeValue::from(t)),
        RawCell::DateTime(dt) => Value::DateTime(DateTimeValue::from(dt)),
        RawCell::Other(s) => Value::NotIdentified(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn test_numeric_cells_become_numbers() {
        assert_eq!(normalize(RawCell::Integer(42)).value_type(), ValueType::Number);
        assert_eq!(normalize(RawCell::Real(1.25)).value_type(), ValueType::Number);
        let decimal = normalize(RawCell::Decimal("12.3400".to_string()));
        assert_eq!(decimal.as_number().unwrap().as_str(), "12.3400");
    }

    #[test]
    fn test_unclassifiable_cells_are_not_identified() {
        assert_eq!(
            normalize(RawCell::Real(f64::NAN)).value_type(),
            ValueType::NotIdentified
        );
        assert_eq!(
            normalize(RawCell::Decimal("12,5".to_string())).value_type(),
            ValueType::NotIdentified
        );
        assert_eq!(
            normalize(RawCell::Other("POINT(1 2)".to_string())).value_type(),
            ValueType::NotIdentified
        );
    }

    #[test]
    fn test_temporal_cells_keep_their_components() {
        let date = NaiveDate::from_ymd_opt(2014, 5, 24).unwrap();
        let time = NaiveTime::from_hms_opt(9, 46, 30).unwrap();
        assert_eq!(normalize(RawCell::Date(date)).value_type(), ValueType::Date);
        assert_eq!(normalize(RawCell::Time(time)).value_type(), ValueType::Time);
        assert_eq!(
            normalize(RawCell::DateTime(date.and_time(time))).to_string(),
            "2014-05-24T09:46:30.000000000"
        );
    }
}
