//! Rebased accelerometer recording.

use crate::model::timestamp::Timestamp;

/// One accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Absolute instant after rebasing.
    pub timestamp: Timestamp,
    /// Device-relative value exactly as read from the file.
    pub original_timestamp: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Samples of one recording with absolute timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Folder name, e.g. `2023_05_01_14_30_00`.
    pub name: String,
    /// Absolute instant encoded by the folder name.
    pub start: Timestamp,
    pub samples: Vec<Sample>,
}

impl Recording {
    /// First and last absolute timestamps, or `None` without samples.
    pub fn span(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some((first.timestamp, last.timestamp))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
