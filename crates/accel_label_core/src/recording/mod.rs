//! Recording loading and timestamp rebasing.
//!
//! # Responsibility
//! - Parse `acceleration.csv` tables into `Recording` values.
//! - Rebase device-relative timestamps onto absolute time.
//!
//! # Invariants
//! - The first file line is a device comment and is never parsed.
//! - The device-relative column is preserved untouched next to the rebased one.

use crate::time::TimeError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod loader;

pub use loader::{load_acceleration, load_recording, ACCELERATION_FILE_NAME};

pub type RecordingResult<T> = Result<T, RecordingError>;

#[derive(Debug)]
pub enum RecordingError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },
    Time(TimeError),
}

impl Display for RecordingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Csv { path, source } => {
                write!(f, "malformed csv in `{}`: {source}", path.display())
            }
            Self::MissingColumn { path, column } => {
                write!(f, "column `{column}` missing in `{}`", path.display())
            }
            Self::Parse {
                path,
                line,
                message,
            } => write!(f, "{}:{line}: {message}", path.display()),
            Self::Time(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::MissingColumn { .. } => None,
            Self::Parse { .. } => None,
            Self::Time(err) => Some(err),
        }
    }
}

impl From<TimeError> for RecordingError {
    fn from(value: TimeError) -> Self {
        Self::Time(value)
    }
}
