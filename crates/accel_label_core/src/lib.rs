//! Core logic for accelerometer recording labeling.
//! Front-ends drive a `Session` and display the figures it returns.

pub mod config;
pub mod figure;
pub mod layout;
pub mod logging;
pub mod model;
pub mod recording;
pub mod repo;
pub mod service;
pub mod time;

pub use config::{AppConfig, ConfigError};
pub use figure::{build_figure, render_html, Figure, FigureOptions, DEFAULT_DECIMATION};
pub use layout::{DataLayout, FsRecordingSource, LayoutError, RecordingSource};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::interval::{Interval, IntervalKind, IntervalSet, IntervalValidationError, Selection};
pub use model::recording::{Recording, Sample};
pub use model::timestamp::{Timestamp, TimestampParseError};
pub use recording::{load_acceleration, load_recording, RecordingError};
pub use repo::interval_repo::{FsIntervalRepository, IntervalRepository, RepoError, RepoResult};
pub use service::session::{
    describe_selection, Action, DeleteOutcome, Render, Session, SessionError, SessionResult,
};
pub use time::{local_fields, recording_start, TimeError, WallClock, DEFAULT_UTC_OFFSET_HOURS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds a filesystem-backed session for a validated configuration.
///
/// # Errors
/// - `LayoutError::MissingRoot` / `MissingRaw` when the data root is unusable.
pub fn open_session(
    config: &AppConfig,
) -> Result<Session<FsIntervalRepository, FsRecordingSource>, LayoutError> {
    let layout = DataLayout::open(&config.data_root)?;
    let repo = FsIntervalRepository::new(layout.labeled_dir());
    let source = FsRecordingSource::new(layout, config.utc_offset_hours);
    let options = FigureOptions {
        decimation: config.decimation,
        ..FigureOptions::default()
    };
    Ok(Session::new(repo, source, options))
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
