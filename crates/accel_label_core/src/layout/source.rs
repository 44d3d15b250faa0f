//! Recording discovery over the raw-input subtree.

use super::{list_dir_names, DataLayout, LayoutError, LayoutResult};
use crate::model::recording::Recording;
use crate::recording::{load_recording, RecordingResult, ACCELERATION_FILE_NAME};
use std::path::PathBuf;

/// Source of projects and their recordings.
pub trait RecordingSource {
    fn list_projects(&self) -> LayoutResult<Vec<String>>;
    fn list_recordings(&self, project: &str) -> LayoutResult<Vec<String>>;
    /// Locates, parses and rebases one recording.
    fn load_recording(&self, project: &str, recording: &str) -> RecordingResult<Recording>;
}

/// Filesystem recording source rooted at `<root>/0_raw`.
pub struct FsRecordingSource {
    layout: DataLayout,
    utc_offset_hours: i64,
}

impl FsRecordingSource {
    pub fn new(layout: DataLayout, utc_offset_hours: i64) -> Self {
        Self {
            layout,
            utc_offset_hours,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn acceleration_file(&self, project: &str, recording: &str) -> PathBuf {
        self.layout
            .raw_dir()
            .join(project)
            .join(recording)
            .join(ACCELERATION_FILE_NAME)
    }
}

impl RecordingSource for FsRecordingSource {
    fn list_projects(&self) -> LayoutResult<Vec<String>> {
        list_dir_names(self.layout.raw_dir())
    }

    fn list_recordings(&self, project: &str) -> LayoutResult<Vec<String>> {
        let dir = self.layout.raw_dir().join(project);
        if project.is_empty() || !dir.is_dir() {
            return Err(LayoutError::MissingProject(project.to_string()));
        }
        list_dir_names(&dir)
    }

    fn load_recording(&self, project: &str, recording: &str) -> RecordingResult<Recording> {
        let path = self.acceleration_file(project, recording);
        load_recording(&path, recording, self.utc_offset_hours)
    }
}
