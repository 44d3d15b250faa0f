//! Recording-name time conversion.
//!
//! # Responsibility
//! - Turn a `YYYY_MM_DD_hh_mm_ss` recording folder name into the absolute
//!   instant at which the recording started.
//!
//! # Invariants
//! - The wall-clock correction is a fixed hour offset, not a timezone
//!   database lookup. Daylight-saving transitions are not modeled.
//! - Underscores and dashes are both accepted as field separators.

use crate::model::timestamp::Timestamp;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hours subtracted from the recording wall clock to reach absolute time.
pub const DEFAULT_UTC_OFFSET_HOURS: i64 = 4;

const NAME_FIELD_COUNT: usize = 6;

pub type TimeResult<T> = Result<T, TimeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Name does not split into six integer fields.
    MalformedName(String),
    /// Fields parse but do not form a calendar date and time.
    InvalidDate(String),
    /// Instant falls outside the nanosecond range.
    OutOfRange(String),
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedName(name) => write!(
                f,
                "recording name `{name}` is not of the form YYYY_MM_DD_hh_mm_ss"
            ),
            Self::InvalidDate(name) => {
                write!(f, "recording name `{name}` does not describe a valid date")
            }
            Self::OutOfRange(name) => {
                write!(f, "recording name `{name}` is outside the supported time range")
            }
        }
    }
}

impl Error for TimeError {}

/// Local calendar fields encoded in a recording name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallClock {
    /// Splits a recording name into its six fields.
    pub fn parse(name: &str) -> TimeResult<Self> {
        let malformed = || TimeError::MalformedName(name.to_string());
        let normalized = name.trim().replace('_', "-");
        let parts: Vec<&str> = normalized.split('-').collect();
        if parts.len() != NAME_FIELD_COUNT {
            return Err(malformed());
        }

        let number = |index: usize| -> TimeResult<u32> {
            parts[index].trim().parse::<u32>().map_err(|_| malformed())
        };
        let year = parts[0].trim().parse::<i32>().map_err(|_| malformed())?;

        Ok(Self {
            year,
            month: number(1)?,
            day: number(2)?,
            hour: number(3)?,
            minute: number(4)?,
            second: number(5)?,
        })
    }

    fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    fn from_naive(value: NaiveDateTime) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
        }
    }

    /// Formats the fields back into the canonical underscore name.
    pub fn recording_name(&self) -> String {
        format!(
            "{:04}_{:02}_{:02}_{:02}_{:02}_{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Returns the absolute start instant encoded by a recording name.
///
/// The wall-clock fields are read as local time and shifted back by
/// `utc_offset_hours`.
///
/// # Errors
/// - `MalformedName` when the name is not six integer fields.
/// - `InvalidDate` when the fields are not a real date and time.
/// - `OutOfRange` when the instant overflows epoch nanoseconds.
pub fn recording_start(name: &str, utc_offset_hours: i64) -> TimeResult<Timestamp> {
    let clock = WallClock::parse(name)?;
    let local = clock
        .to_naive()
        .ok_or_else(|| TimeError::InvalidDate(name.to_string()))?;
    let absolute = Duration::try_hours(utc_offset_hours)
        .and_then(|offset| local.checked_sub_signed(offset))
        .ok_or_else(|| TimeError::OutOfRange(name.to_string()))?;

    Timestamp::from_naive(absolute).ok_or_else(|| TimeError::OutOfRange(name.to_string()))
}

/// Recovers the local wall-clock fields of an absolute instant.
pub fn local_fields(timestamp: Timestamp, utc_offset_hours: i64) -> WallClock {
    let offset_nanos = utc_offset_hours.saturating_mul(3_600_000_000_000);
    WallClock::from_naive(timestamp.offset_by(offset_nanos).to_naive())
}
