//! Interval repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Load and persist one project's regions and labels.
//! - Keep file naming and JSON details inside the storage boundary.
//!
//! # Invariants
//! - A missing file reads as an empty sequence, never as an error.
//! - Read paths reject reversed intervals instead of masking them.
//! - Saves overwrite both files as a whole.

use crate::model::interval::{Interval, IntervalKind, IntervalSet, IntervalValidationError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for interval load/save operations.
#[derive(Debug)]
pub enum RepoError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidData {
        path: PathBuf,
        source: IntervalValidationError,
    },
    InvalidProject(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error on `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid interval json in `{}`: {source}", path.display())
            }
            Self::InvalidData { path, source } => {
                write!(f, "invalid persisted interval in `{}`: {source}", path.display())
            }
            Self::InvalidProject(name) => write!(f, "invalid project name `{name}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidData { source, .. } => Some(source),
            Self::InvalidProject(_) => None,
        }
    }
}

/// Repository interface for per-project interval storage.
pub trait IntervalRepository {
    /// Creates the project's storage location when absent.
    fn ensure_project(&self, project: &str) -> RepoResult<()>;
    fn load(&self, project: &str) -> RepoResult<IntervalSet>;
    fn save(&self, project: &str, intervals: &IntervalSet) -> RepoResult<()>;
}

/// JSON-file repository rooted at the labeled-output directory.
///
/// Layout: `<labeled_dir>/<project>/regions.json` and `labels.json`.
pub struct FsIntervalRepository {
    labeled_dir: PathBuf,
}

impl FsIntervalRepository {
    pub fn new(labeled_dir: impl Into<PathBuf>) -> Self {
        Self {
            labeled_dir: labeled_dir.into(),
        }
    }

    pub fn project_dir(&self, project: &str) -> RepoResult<PathBuf> {
        validate_project_name(project)?;
        Ok(self.labeled_dir.join(project))
    }

    pub fn interval_file(&self, project: &str, kind: IntervalKind) -> RepoResult<PathBuf> {
        Ok(self.project_dir(project)?.join(kind.file_name()))
    }
}

impl IntervalRepository for FsIntervalRepository {
    fn ensure_project(&self, project: &str) -> RepoResult<()> {
        let dir = self.project_dir(project)?;
        fs::create_dir_all(&dir).map_err(|source| RepoError::Io { path: dir, source })
    }

    fn load(&self, project: &str) -> RepoResult<IntervalSet> {
        let mut intervals = IntervalSet::new();
        for kind in IntervalKind::ALL {
            let path = self.interval_file(project, kind)?;
            for interval in read_sequence(&path)? {
                intervals.append(kind, interval);
            }
        }

        info!(
            "event=intervals_load module=repo status=ok project={} regions={} labels={}",
            project,
            intervals.regions.len(),
            intervals.labels.len()
        );
        Ok(intervals)
    }

    fn save(&self, project: &str, intervals: &IntervalSet) -> RepoResult<()> {
        self.ensure_project(project)?;
        for kind in IntervalKind::ALL {
            let path = self.interval_file(project, kind)?;
            if let Err(err) = write_sequence(&path, intervals.get(kind)) {
                error!(
                    "event=intervals_save module=repo status=error project={} kind={} error={}",
                    project,
                    kind.name(),
                    err
                );
                return Err(err);
            }
        }

        info!(
            "event=intervals_save module=repo status=ok project={} regions={} labels={}",
            project,
            intervals.regions.len(),
            intervals.labels.len()
        );
        Ok(())
    }
}

fn validate_project_name(project: &str) -> RepoResult<()> {
    let trimmed = project.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed != project;
    if invalid {
        return Err(RepoError::InvalidProject(project.to_string()));
    }
    Ok(())
}

fn read_sequence(path: &Path) -> RepoResult<Vec<Interval>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RepoError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let intervals: Vec<Interval> =
        serde_json::from_slice(&bytes).map_err(|source| RepoError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    for interval in &intervals {
        interval.validate().map_err(|source| RepoError::InvalidData {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(intervals)
}

fn write_sequence(path: &Path, intervals: &[Interval]) -> RepoResult<()> {
    let json = serde_json::to_vec(intervals).map_err(|source| RepoError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    // Write a sibling file first so a crash never leaves a truncated sequence.
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|source| RepoError::Io {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, path).map_err(|source| RepoError::Io {
        path: path.to_path_buf(),
        source,
    })
}
