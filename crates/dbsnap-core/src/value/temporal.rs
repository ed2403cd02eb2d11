//! Date, time and date/time values.
//!
//! Thin wrappers over `chrono` naive types with the constructors and the
//! display format assertion messages use (`2014-05-24T09:46:30.000000000`).

use crate::errors::{DbSnapError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateValue(NaiveDate);

impl DateValue {
    /// # Errors
    ///
    /// `InvalidValue` for a day that does not exist (e.g. `2014-02-30`).
    pub fn of(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DbSnapError::InvalidValue {
                reason: format!("{:04}-{:02}-{:02} is not a valid date", year, month, day),
            })
    }

    /// Parse `yyyy-MM-dd`
    ///
    /// # Errors
    ///
    /// `InvalidValue` when the text is not a calendar date.
    pub fn parse(text: &str) -> Result<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| DbSnapError::InvalidValue {
                reason: format!("<{}> is not a date: {}", text, e),
            })
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A time of day with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeValue(NaiveTime);

impl TimeValue {
    /// # Errors
    ///
    /// `InvalidValue` when a component is out of range.
    pub fn of(hours: u32, minutes: u32, seconds: u32) -> Result<Self> {
        Self::of_nanos(hours, minutes, seconds, 0)
    }

    /// # Errors
    ///
    /// `InvalidValue` when a component is out of range. Leap seconds are
    /// rejected: `nanos` must be below one second.
    pub fn of_nanos(hours: u32, minutes: u32, seconds: u32, nanos: u32) -> Result<Self> {
        if nanos >= 1_000_000_000 {
            return Err(DbSnapError::InvalidValue {
                reason: format!("{} nanoseconds is not below one second", nanos),
            });
        }
        NaiveTime::from_hms_nano_opt(hours, minutes, seconds, nanos)
            .map(Self)
            .ok_or_else(|| DbSnapError::InvalidValue {
                reason: format!(
                    "{:02}:{:02}:{:02}.{:09} is not a valid time",
                    hours, minutes, seconds, nanos
                ),
            })
    }

    /// Parse `HH:mm`, `HH:mm:ss` or `HH:mm:ss.nnnnnnnnn`
    ///
    /// # Errors
    ///
    /// `InvalidValue` when no format matches.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
            .map(Self)
            .ok_or_else(|| DbSnapError::InvalidValue {
                reason: format!("<{}> is not a time", text),
            })
    }

    /// Midnight
    pub fn zero() -> Self {
        Self(NaiveTime::MIN)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == NaiveTime::MIN
    }

    pub fn hours(&self) -> u32 {
        self.0.hour()
    }

    pub fn minutes(&self) -> u32 {
        self.0.minute()
    }

    pub fn seconds(&self) -> u32 {
        self.0.second()
    }

    pub fn nanos(&self) -> u32 {
        self.0.nanosecond()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for TimeValue {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl std::fmt::Display for TimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:09}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.nanos()
        )
    }
}

/// A date plus a time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTimeValue {
    date: DateValue,
    time: TimeValue,
}

impl DateTimeValue {
    pub fn of(date: DateValue, time: TimeValue) -> Self {
        Self { date, time }
    }

    /// The date at midnight
    pub fn of_date(date: DateValue) -> Self {
        Self {
            date,
            time: TimeValue::zero(),
        }
    }

    /// Parse `yyyy-MM-ddTHH:mm[:ss[.n]]` (a space may replace the `T`) or a
    /// bare `yyyy-MM-dd`, which gives midnight.
    ///
    /// # Errors
    ///
    /// `InvalidValue` when neither a date-time nor a date format matches.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if let Some(parsed) = DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        {
            return Ok(parsed.into());
        }
        DateValue::parse(trimmed)
            .map(Self::of_date)
            .map_err(|_| DbSnapError::InvalidValue {
                reason: format!("<{}> is not a date/time", text),
            })
    }

    pub fn date(&self) -> DateValue {
        self.date
    }

    pub fn time(&self) -> TimeValue {
        self.time
    }

    /// True when the time-of-day component is midnight
    pub fn is_date_only(&self) -> bool {
        self.time.is_zero()
    }
}

impl From<NaiveDateTime> for DateTimeValue {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            date: DateValue(value.date()),
            time: TimeValue(value.time()),
        }
    }
}

impl std::fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

macro_rules! serialize_as_display {
    ($($t:ty),*) => {
        $(
            impl Serialize for $t {
                fn serialize<S: Serializer>(
                    &self,
                    serializer: S,
                ) -> std::result::Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_display!(DateValue, TimeValue, DateTimeValue);
