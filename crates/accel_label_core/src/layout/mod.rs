//! Data-root layout and startup validation.
//!
//! # Responsibility
//! - Validate the data root before any recording or interval access.
//! - Resolve raw-input and labeled-output paths.
//!
//! # Invariants
//! - A missing root or raw-input subtree is fatal.
//! - A missing labeled-output subtree is created, not reported.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

mod source;

pub use source::{FsRecordingSource, RecordingSource};

/// Raw-input subtree: `<root>/0_raw/<project>/<recording>/acceleration.csv`.
pub const RAW_DIR_NAME: &str = "0_raw";
/// Labeled-output subtree: `<root>/1_labeled/<project>/{regions,labels}.json`.
pub const LABELED_DIR_NAME: &str = "1_labeled";

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug)]
pub enum LayoutError {
    MissingRoot(PathBuf),
    MissingRaw(PathBuf),
    MissingProject(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRoot(path) => {
                write!(f, "data root `{}` is not a directory", path.display())
            }
            Self::MissingRaw(path) => write!(
                f,
                "raw-input directory `{}` not found; put participant projects in there",
                path.display()
            ),
            Self::MissingProject(name) => write!(f, "project `{name}` not found"),
            Self::Io { path, source } => write!(f, "io error on `{}`: {source}", path.display()),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validated data-root layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
    raw_dir: PathBuf,
    labeled_dir: PathBuf,
}

impl DataLayout {
    /// Opens and validates a data root.
    ///
    /// # Side effects
    /// - Creates `<root>/1_labeled` when absent.
    /// - Emits a `layout_open` logging event.
    ///
    /// # Errors
    /// - `MissingRoot` when `root` is not a directory.
    /// - `MissingRaw` when `<root>/0_raw` is not a directory.
    /// - `Io` when the labeled-output directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> LayoutResult<Self> {
        let root = root.as_ref().to_path_buf();
        let result = Self::open_inner(root.clone());
        match &result {
            Ok(_) => info!(
                "event=layout_open module=layout status=ok root={}",
                root.display()
            ),
            Err(err) => error!(
                "event=layout_open module=layout status=error root={} error={}",
                root.display(),
                err
            ),
        }
        result
    }

    fn open_inner(root: PathBuf) -> LayoutResult<Self> {
        if !root.is_dir() {
            return Err(LayoutError::MissingRoot(root));
        }

        let raw_dir = root.join(RAW_DIR_NAME);
        if !raw_dir.is_dir() {
            return Err(LayoutError::MissingRaw(raw_dir));
        }

        let labeled_dir = root.join(LABELED_DIR_NAME);
        if !labeled_dir.is_dir() {
            fs::create_dir_all(&labeled_dir).map_err(|source| LayoutError::Io {
                path: labeled_dir.clone(),
                source,
            })?;
        }

        Ok(Self {
            root,
            raw_dir,
            labeled_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn labeled_dir(&self) -> &Path {
        &self.labeled_dir
    }
}

/// Sorted names of the sub-directories of `dir`.
pub(crate) fn list_dir_names(dir: &Path) -> LayoutResult<Vec<String>> {
    let io_error = |source| LayoutError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
