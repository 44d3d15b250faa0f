//! `acceleration.csv` reader.
//!
//! # Responsibility
//! - Locate the `timestamp,x,y,z` columns by header name.
//! - Produce absolute timestamps anchored at the recording start instant.
//!
//! # Invariants
//! - `timestamp[i] - start == original[i] - original[0]` for every sample.

use super::{RecordingError, RecordingResult};
use crate::model::recording::{Recording, Sample};
use crate::model::timestamp::Timestamp;
use crate::time::recording_start;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, error};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// File name of the per-recording acceleration table.
pub const ACCELERATION_FILE_NAME: &str = "acceleration.csv";

const TIMESTAMP_COLUMN: &str = "timestamp";
const AXIS_COLUMNS: [&str; 3] = ["x", "y", "z"];

struct Columns {
    timestamp: usize,
    axes: [usize; 3],
}

impl Columns {
    fn locate(headers: &StringRecord, path: &Path) -> RecordingResult<Self> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(column))
                .ok_or_else(|| RecordingError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };

        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN)?,
            axes: [find(AXIS_COLUMNS[0])?, find(AXIS_COLUMNS[1])?, find(AXIS_COLUMNS[2])?],
        })
    }
}

/// Loads a recording folder's table and rebases it onto the instant encoded
/// by `name`.
///
/// # Errors
/// - `Time` when `name` is not a valid recording timestamp.
/// - Any error of [`load_acceleration`].
pub fn load_recording(path: &Path, name: &str, utc_offset_hours: i64) -> RecordingResult<Recording> {
    let start = recording_start(name, utc_offset_hours)?;
    load_acceleration(path, name, start)
}

/// Parses an acceleration table and rebases its timestamps onto `start`.
///
/// # Side effects
/// - Emits a `recording_load` logging event with sample count and duration.
///
/// # Errors
/// - `Io` when the file cannot be opened or read.
/// - `MissingColumn` when the header lacks `timestamp`, `x`, `y` or `z`.
/// - `Parse` when a cell is not numeric.
/// - `Csv` for structural CSV problems such as ragged rows.
pub fn load_acceleration(path: &Path, name: &str, start: Timestamp) -> RecordingResult<Recording> {
    let started_at = Instant::now();
    match read_samples(path, start) {
        Ok(samples) => {
            debug!(
                "event=recording_load module=recording status=ok recording={} samples={} duration_ms={}",
                name,
                samples.len(),
                started_at.elapsed().as_millis()
            );
            Ok(Recording {
                name: name.to_string(),
                start,
                samples,
            })
        }
        Err(err) => {
            error!(
                "event=recording_load module=recording status=error recording={} duration_ms={} error={}",
                name,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn read_samples(path: &Path, start: Timestamp) -> RecordingResult<Vec<Sample>> {
    let io_error = |source| RecordingError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| RecordingError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut device_comment = String::new();
    reader.read_line(&mut device_comment).map_err(io_error)?;

    let mut table = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(table.headers().map_err(csv_error)?, path)?;

    let mut samples = Vec::new();
    let mut origin = None;
    for record in table.records() {
        let record = record.map_err(csv_error)?;
        // The device comment line is not counted by the csv reader.
        let line = record.position().map(|pos| pos.line() + 1).unwrap_or_default();
        let cell = |index: usize| record.get(index).unwrap_or_default();
        let parse_error = |message: String| RecordingError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };

        let raw_timestamp = cell(columns.timestamp);
        let original = parse_device_timestamp(raw_timestamp)
            .ok_or_else(|| parse_error(format!("invalid timestamp `{raw_timestamp}`")))?;
        let origin = *origin.get_or_insert(original);

        let mut axes = [0.0_f64; 3];
        for (slot, (index, column)) in axes
            .iter_mut()
            .zip(columns.axes.iter().zip(AXIS_COLUMNS))
        {
            let raw = cell(*index);
            *slot = raw
                .parse::<f64>()
                .map_err(|_| parse_error(format!("invalid {column} value `{raw}`")))?;
        }

        samples.push(Sample {
            timestamp: start.offset_by(original.saturating_sub(origin)),
            original_timestamp: original,
            x: axes[0],
            y: axes[1],
            z: axes[2],
        });
    }

    Ok(samples)
}

/// Integer nanoseconds; decimal values are truncated toward zero.
fn parse_device_timestamp(value: &str) -> Option<i64> {
    if let Ok(parsed) = value.parse::<i64>() {
        return Some(parsed);
    }
    let parsed = value.parse::<f64>().ok()?;
    if !parsed.is_finite() || parsed.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(parsed.trunc() as i64)
}
