//! Absolute timestamp value type.
//!
//! # Responsibility
//! - Represent instants as signed nanoseconds since the Unix epoch.
//! - Own the ISO-8601-like text form used in interval files and figures.
//!
//! # Invariants
//! - Text output is `YYYY-MM-DD HH:MM:SS` with an optional 3/6/9 digit
//!   fraction, and always parses back to the same instant.
//! - Parsing accepts a space or `T` separator, an optional fraction of up to
//!   nine digits and an optional trailing `Z`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

static TIMESTAMP_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?Z?$",
    )
    .expect("timestamp pattern is valid")
});

/// Absolute instant in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

/// Text that does not describe a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError {
    input: String,
}

impl Display for TimestampParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid timestamp `{}`", self.input)
    }
}

impl Error for TimestampParseError {}

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Converts a naive date-time read as UTC.
    ///
    /// Returns `None` outside the representable nanosecond range
    /// (roughly years 1677..2262).
    pub fn from_naive(value: NaiveDateTime) -> Option<Self> {
        value.and_utc().timestamp_nanos_opt().map(Self)
    }

    pub fn to_naive(self) -> NaiveDateTime {
        let secs = self.0.div_euclid(NANOS_PER_SECOND);
        let nanos = self.0.rem_euclid(NANOS_PER_SECOND) as u32;
        DateTime::from_timestamp(secs, nanos)
            .map(|value| value.naive_utc())
            .unwrap_or_default()
    }

    /// Shifts by a signed nanosecond delta, saturating at the type bounds.
    pub fn offset_by(self, nanos: i64) -> Self {
        Self(self.0.saturating_add(nanos))
    }

    /// Signed nanoseconds from `earlier` to `self`.
    pub fn nanos_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let naive = self.to_naive();
        write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S"))?;

        let nanos = naive.nanosecond();
        if nanos == 0 {
            Ok(())
        } else if nanos % 1_000_000 == 0 {
            write!(f, ".{:03}", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            write!(f, ".{:06}", nanos / 1_000)
        } else {
            write!(f, ".{nanos:09}")
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || TimestampParseError {
            input: trimmed.to_string(),
        };
        let captures = TIMESTAMP_TEXT.captures(trimmed).ok_or_else(invalid)?;

        let field = |index: usize| -> Result<u32, TimestampParseError> {
            match captures.get(index) {
                Some(m) => m.as_str().parse().map_err(|_| invalid()),
                None => Ok(0),
            }
        };
        let year: i32 = captures[1].parse().map_err(|_| invalid())?;
        let nanos = match captures.get(7) {
            Some(fraction) => {
                let digits = fraction.as_str();
                let padded = format!("{digits:0<9}");
                padded.parse::<u32>().map_err(|_| invalid())?
            }
            None => 0,
        };

        let (month, day) = (field(2)?, field(3)?);
        let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);

        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_nano_opt(hour, minute, second, nanos))
            .ok_or_else(invalid)?;
        Self::from_naive(naive).ok_or_else(invalid)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn display_omits_zero_fraction() {
        let ts: Timestamp = "2023-05-01 12:30:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2023-05-01 12:30:00");
    }

    #[test]
    fn display_uses_shortest_fraction_group() {
        let base: Timestamp = "2023-05-01 12:30:00".parse().unwrap();
        assert_eq!(base.offset_by(250_000_000).to_string(), "2023-05-01 12:30:00.250");
        assert_eq!(base.offset_by(1_500).to_string(), "2023-05-01 12:30:00.000001500");
        assert_eq!(base.offset_by(42_000).to_string(), "2023-05-01 12:30:00.000042");
    }

    #[test]
    fn parse_accepts_plot_range_forms() {
        let spaced: Timestamp = "2023-05-01 12:30:00.25".parse().unwrap();
        let iso: Timestamp = "2023-05-01T12:30:00.250Z".parse().unwrap();
        let minutes: Timestamp = "2023-05-01 12:30".parse().unwrap();
        assert_eq!(spaced, iso);
        assert_eq!(minutes.offset_by(250_000_000), spaced);
    }

    #[test]
    fn parse_rejects_garbage_and_impossible_dates() {
        assert!("yesterday".parse::<Timestamp>().is_err());
        assert!("2023-02-30 00:00:00".parse::<Timestamp>().is_err());
        assert!("2023-05-01 25:00:00".parse::<Timestamp>().is_err());
    }

    #[test]
    fn negative_instants_render_before_epoch() {
        let ts = Timestamp::from_nanos(-1_000_000_000);
        assert_eq!(ts.to_string(), "1969-12-31 23:59:59");
        assert_eq!(ts.to_string().parse::<Timestamp>().unwrap(), ts);
    }
}
