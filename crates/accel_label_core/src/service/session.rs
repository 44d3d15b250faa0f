//! Labeling session: explicit context plus action dispatch.
//!
//! # Responsibility
//! - Hold the active project, its intervals, the active recording and the
//!   view flag in one value instead of process-wide state.
//! - Map every user action to a state transition and a recomputed chart.
//!
//! # Invariants
//! - One action runs to completion before the next; no interior mutability.
//! - Selecting a project replaces in-memory intervals, discarding unsaved
//!   edits of the previous project.
//! - Save is only accepted after the active project was loaded.
//! - Charts are recomputed from current state, never patched.

use crate::figure::{build_figure, Figure, FigureOptions};
use crate::layout::{LayoutError, RecordingSource};
use crate::model::interval::{
    Interval, IntervalKind, IntervalSet, IntervalValidationError, Selection,
};
use crate::model::recording::Recording;
use crate::recording::RecordingError;
use crate::repo::interval_repo::{IntervalRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Repo(RepoError),
    Layout(LayoutError),
    Recording(RecordingError),
    Interval(IntervalValidationError),
    /// Save requested before any project was loaded.
    NotLoaded,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            Self::Recording(err) => write!(f, "{err}"),
            Self::Interval(err) => write!(f, "{err}"),
            Self::NotLoaded => write!(f, "no project loaded; select a project before saving"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Recording(err) => Some(err),
            Self::Interval(err) => Some(err),
            Self::NotLoaded => None,
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<LayoutError> for SessionError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<RecordingError> for SessionError {
    fn from(value: RecordingError) -> Self {
        Self::Recording(value)
    }
}

impl From<IntervalValidationError> for SessionError {
    fn from(value: IntervalValidationError) -> Self {
        Self::Interval(value)
    }
}

/// User actions. Selections are the current pan/zoom window, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectProject(String),
    SelectRecording(String),
    WriteRegion(Option<Selection>),
    /// Adds a smoking label.
    AddLabel(Option<Selection>),
    Delete(Option<Selection>),
    ToggleView,
    Save,
    DescribeSelection(Option<Selection>),
}

/// Output of one dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    /// Recomputed chart; `None` when the action has no visible effect.
    pub figure: Option<Figure>,
    /// Recording choices, set after a project selection.
    pub recordings: Option<Vec<String>>,
    pub status: String,
}

impl Render {
    fn chart(figure: Figure, status: impl Into<String>) -> Self {
        Self {
            figure: Some(figure),
            recordings: None,
            status: status.into(),
        }
    }

    fn status_only(status: impl Into<String>) -> Self {
        Self {
            figure: None,
            recordings: None,
            status: status.into(),
        }
    }
}

/// What a delete action removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(IntervalKind, Interval),
    /// Zero or several candidates of each kind.
    Ambiguous,
}

/// Interactive labeling context.
pub struct Session<R: IntervalRepository, S: RecordingSource> {
    repo: R,
    source: S,
    project: Option<String>,
    intervals: IntervalSet,
    recording: Option<Recording>,
    options: FigureOptions,
}

impl<R: IntervalRepository, S: RecordingSource> Session<R, S> {
    pub fn new(repo: R, source: S, options: FigureOptions) -> Self {
        Self {
            repo,
            source,
            project: None,
            intervals: IntervalSet::new(),
            recording: None,
            options,
        }
    }

    /// Loaded project, if any.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    pub fn intervals(&self) -> &IntervalSet {
        &self.intervals
    }

    pub fn options(&self) -> &FigureOptions {
        &self.options
    }

    pub fn restrict_to_recording(&self) -> bool {
        self.options.restrict_to_recording
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Chart for the current state; empty without an active recording.
    pub fn figure(&self) -> Figure {
        match &self.recording {
            Some(recording) => build_figure(recording, &self.intervals, &self.options),
            None => Figure::empty(),
        }
    }

    /// Applies one action.
    ///
    /// # Errors
    /// - Storage and recording errors of the underlying action.
    /// - `Interval` when a selection is reversed.
    /// - `NotLoaded` when saving before a project was loaded.
    pub fn dispatch(&mut self, action: Action) -> SessionResult<Render> {
        match action {
            Action::SelectProject(project) => self.select_project(&project),
            Action::SelectRecording(recording) => self.select_recording(&recording),
            Action::WriteRegion(selection) => self.append(IntervalKind::Region, selection),
            Action::AddLabel(selection) => self.append(IntervalKind::Label, selection),
            Action::Delete(selection) => self.delete(selection),
            Action::ToggleView => Ok(self.toggle_view()),
            Action::Save => self.save(),
            Action::DescribeSelection(selection) => {
                Ok(Render::status_only(describe_selection(selection.as_ref())))
            }
        }
    }

    fn select_project(&mut self, project: &str) -> SessionResult<Render> {
        self.project = None;
        self.intervals = IntervalSet::new();
        self.recording = None;

        let recordings = self.source.list_recordings(project)?;
        self.repo.ensure_project(project)?;
        let intervals = self.repo.load(project)?;

        info!(
            "event=project_select module=session status=ok project={} recordings={} intervals={}",
            project,
            recordings.len(),
            intervals.len()
        );
        self.project = Some(project.to_string());
        self.intervals = intervals;

        Ok(Render {
            figure: Some(Figure::empty()),
            status: format!("project {project}: {} recordings", recordings.len()),
            recordings: Some(recordings),
        })
    }

    fn select_recording(&mut self, recording: &str) -> SessionResult<Render> {
        self.recording = None;
        let Some(project) = self.project.clone() else {
            return Ok(Render::chart(Figure::empty(), "no project selected"));
        };
        if recording.is_empty() {
            return Ok(Render::chart(Figure::empty(), "no recording selected"));
        }

        let loaded = self.source.load_recording(&project, recording)?;
        info!(
            "event=recording_select module=session status=ok project={} recording={} samples={}",
            project,
            recording,
            loaded.len()
        );
        let status = match loaded.span() {
            Some((first, last)) => format!("recording {recording}: {first} .. {last}"),
            None => format!("recording {recording}: no samples"),
        };
        self.recording = Some(loaded);
        Ok(Render::chart(self.figure(), status))
    }

    /// Selection, or the active recording's full span as fallback.
    fn effective_window(&self, selection: Option<Selection>) -> Option<Selection> {
        selection.or_else(|| {
            let (first, last) = self.recording.as_ref()?.span()?;
            Some(Selection {
                start: first,
                end: last,
            })
        })
    }

    fn append(&mut self, kind: IntervalKind, selection: Option<Selection>) -> SessionResult<Render> {
        if self.recording.is_none() {
            warn!(
                "event=interval_append module=session status=skipped kind={} reason=no_recording",
                kind.name()
            );
            return Ok(Render::chart(Figure::empty(), "no recording selected"));
        }
        let Some(window) = self.effective_window(selection) else {
            return Ok(Render::chart(self.figure(), "recording has no samples"));
        };

        let interval = Interval::new(window.start, window.end)?;
        self.intervals.append(kind, interval);
        info!(
            "event=interval_append module=session status=ok kind={} start={} end={}",
            kind.name(),
            interval.start,
            interval.end
        );
        Ok(Render::chart(
            self.figure(),
            format!("added {} {} .. {}", kind.name(), interval.start, interval.end),
        ))
    }

    fn delete(&mut self, selection: Option<Selection>) -> SessionResult<Render> {
        if self.recording.is_none() {
            return Ok(Render::chart(Figure::empty(), "no recording selected"));
        }
        if let Some(window) = &selection {
            window.to_interval().validate()?;
        }
        let Some(window) = self.effective_window(selection) else {
            return Ok(Render::chart(self.figure(), "recording has no samples"));
        };

        let status = match self.delete_within(&window) {
            DeleteOutcome::Removed(kind, interval) => {
                format!("deleted {} {} .. {}", kind.name(), interval.start, interval.end)
            }
            DeleteOutcome::Ambiguous => "nothing deleted".to_string(),
        };
        Ok(Render::chart(self.figure(), status))
    }

    /// Removes the single label, or else the single region, inside `window`.
    pub fn delete_within(&mut self, window: &Selection) -> DeleteOutcome {
        let labels = self.intervals.find_containing(IntervalKind::Label, window);
        let regions = self.intervals.find_containing(IntervalKind::Region, window);

        let target = match (labels.as_slice(), regions.as_slice()) {
            ([label], _) => Some((IntervalKind::Label, *label)),
            (_, [region]) => Some((IntervalKind::Region, *region)),
            _ => None,
        };

        match target {
            Some((kind, interval)) => {
                self.intervals.remove(kind, &interval);
                info!(
                    "event=interval_delete module=session status=ok kind={} start={} end={}",
                    kind.name(),
                    interval.start,
                    interval.end
                );
                DeleteOutcome::Removed(kind, interval)
            }
            None => {
                info!(
                    "event=interval_delete module=session status=skipped labels={} regions={}",
                    labels.len(),
                    regions.len()
                );
                DeleteOutcome::Ambiguous
            }
        }
    }

    fn toggle_view(&mut self) -> Render {
        self.options.restrict_to_recording = !self.options.restrict_to_recording;
        let status = if self.options.restrict_to_recording {
            "showing intervals of the current recording"
        } else {
            "showing all intervals"
        };
        Render::chart(self.figure(), status)
    }

    fn save(&self) -> SessionResult<Render> {
        let Some(project) = self.project.as_deref() else {
            warn!("event=intervals_save module=session status=rejected reason=not_loaded");
            return Err(SessionError::NotLoaded);
        };

        self.repo.save(project, &self.intervals)?;
        Ok(Render::status_only(format!(
            "saved {} regions and {} labels for {project}",
            self.intervals.regions.len(),
            self.intervals.labels.len()
        )))
    }
}

/// Status text for the current pan/zoom window.
pub fn describe_selection(selection: Option<&Selection>) -> String {
    match selection {
        Some(window) => format!("Selected x-axis limits: ({}, {})", window.start, window.end),
        None => "No zoom action detected".to_string(),
    }
}
