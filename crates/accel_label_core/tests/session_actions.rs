mod common;

use accel_label_core::{
    open_session, Action, AppConfig, FsIntervalRepository, FsRecordingSource, Interval,
    IntervalKind, IntervalRepository, IntervalSet, Selection, Session, SessionError, Timestamp,
};
use std::path::Path;

const RECORDING: &str = "2023_05_01_14_30_00";

type FsSession = Session<FsIntervalRepository, FsRecordingSource>;

/// One project with a 100-sample recording spanning 99 seconds.
fn fixture(dir: &Path) -> FsSession {
    let root = common::data_root(dir);
    common::write_recording(&root, "p01", RECORDING, &common::ramp(100, 0, 1_000_000_000));
    common::write_recording(&root, "p01", "2023_05_01_16_00_00", &common::ramp(10, 0, 1_000_000_000));
    common::write_recording(&root, "p02", "2023_06_01_09_00_00", &common::ramp(10, 0, 1_000_000_000));
    open_session(&AppConfig::new(&root)).unwrap()
}

fn ts(text: &str) -> Timestamp {
    text.parse().unwrap()
}

fn window(start: &str, end: &str) -> Selection {
    Selection::new(ts(start), ts(end)).unwrap()
}

fn open_recording(session: &mut FsSession) {
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    session.dispatch(Action::SelectRecording(RECORDING.to_string())).unwrap();
}

#[test]
fn select_project_lists_recordings_and_resets_chart() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());

    let render = session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    assert_eq!(
        render.recordings,
        Some(vec![RECORDING.to_string(), "2023_05_01_16_00_00".to_string()])
    );
    assert!(render.figure.unwrap().is_empty());
    assert_eq!(session.project(), Some("p01"));
    assert!(session.recording().is_none());
    assert!(dir.path().join("1_labeled/p01").is_dir());
}

#[test]
fn select_recording_renders_decimated_traces() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();

    let render = session.dispatch(Action::SelectRecording(RECORDING.to_string())).unwrap();
    let figure = render.figure.unwrap();
    assert_eq!(figure.data.len(), 3);
    assert_eq!(figure.data[0].x.len(), 4);
    assert_eq!(figure.data[0].x[0], ts("2023-05-01 10:30:00"));
}

#[test]
fn select_recording_without_project_renders_empty_chart() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());

    let render = session.dispatch(Action::SelectRecording(RECORDING.to_string())).unwrap();
    assert!(render.figure.unwrap().is_empty());
}

#[test]
fn missing_recording_file_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();

    let err = session
        .dispatch(Action::SelectRecording("2023_05_01_18_00_00".to_string()))
        .unwrap_err();
    assert!(matches!(err, SessionError::Recording(_)));
}

#[test]
fn write_region_without_selection_spans_whole_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let render = session.dispatch(Action::WriteRegion(None)).unwrap();
    assert_eq!(
        session.intervals().regions,
        vec![Interval::new(ts("2023-05-01 10:30:00"), ts("2023-05-01 10:31:39")).unwrap()]
    );
    assert_eq!(render.figure.unwrap().layout.shapes.len(), 1);
}

#[test]
fn add_label_without_selection_spans_whole_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    session.dispatch(Action::AddLabel(None)).unwrap();

    let (first, last) = session.recording().unwrap().span().unwrap();
    assert_eq!(session.intervals().labels, vec![Interval::new(first, last).unwrap()]);
    assert!(session.intervals().regions.is_empty());
}

#[test]
fn delete_without_selection_uses_whole_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let label = window("2023-05-01 10:30:10", "2023-05-01 10:30:20");
    session.dispatch(Action::AddLabel(Some(label))).unwrap();

    let render = session.dispatch(Action::Delete(None)).unwrap();
    assert!(session.intervals().is_empty());
    assert!(render.status.starts_with("deleted label"));
    assert!(render.figure.unwrap().layout.shapes.is_empty());
}

#[test]
fn add_label_uses_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let selection = window("2023-05-01 10:30:10.5", "2023-05-01 10:30:20");
    session.dispatch(Action::AddLabel(Some(selection))).unwrap();

    assert_eq!(session.intervals().labels, vec![selection.to_interval()]);
    assert!(session.intervals().regions.is_empty());
}

#[test]
fn reversed_selection_is_rejected_without_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let reversed = Selection {
        start: ts("2023-05-01 10:30:20"),
        end: ts("2023-05-01 10:30:10"),
    };
    let err = session.dispatch(Action::AddLabel(Some(reversed))).unwrap_err();
    assert!(matches!(err, SessionError::Interval(_)));
    assert!(session.intervals().is_empty());
}

#[test]
fn mutations_without_recording_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();

    let render = session
        .dispatch(Action::AddLabel(Some(window("2023-05-01 10:30:10", "2023-05-01 10:30:20"))))
        .unwrap();
    assert!(render.figure.unwrap().is_empty());
    assert!(session.intervals().is_empty());
}

#[test]
fn delete_removes_single_contained_label_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let label = window("2023-05-01 10:30:10", "2023-05-01 10:30:20");
    let region = window("2023-05-01 10:30:05", "2023-05-01 10:31:00");
    session.dispatch(Action::AddLabel(Some(label))).unwrap();
    session.dispatch(Action::WriteRegion(Some(region))).unwrap();

    session
        .dispatch(Action::Delete(Some(window("2023-05-01 10:30:09", "2023-05-01 10:30:21"))))
        .unwrap();

    assert!(session.intervals().labels.is_empty());
    assert_eq!(session.intervals().regions, vec![region.to_interval()]);
}

#[test]
fn delete_falls_back_to_single_region() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let first = window("2023-05-01 10:30:10", "2023-05-01 10:30:20");
    let second = window("2023-05-01 10:30:30", "2023-05-01 10:30:40");
    session.dispatch(Action::AddLabel(Some(first))).unwrap();
    session.dispatch(Action::AddLabel(Some(second))).unwrap();
    session.dispatch(Action::WriteRegion(Some(first))).unwrap();

    // Two labels match, so the lone region goes instead.
    session
        .dispatch(Action::Delete(Some(window("2023-05-01 10:30:00", "2023-05-01 10:30:50"))))
        .unwrap();

    assert_eq!(session.intervals().labels.len(), 2);
    assert!(session.intervals().regions.is_empty());
}

#[test]
fn ambiguous_delete_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let first = window("2023-05-01 10:30:10", "2023-05-01 10:30:20");
    let second = window("2023-05-01 10:30:30", "2023-05-01 10:30:40");
    for selection in [first, second] {
        session.dispatch(Action::AddLabel(Some(selection))).unwrap();
        session.dispatch(Action::WriteRegion(Some(selection))).unwrap();
    }
    let before = session.intervals().clone();

    let render = session
        .dispatch(Action::Delete(Some(window("2023-05-01 10:30:00", "2023-05-01 10:30:50"))))
        .unwrap();
    assert_eq!(session.intervals(), &before);
    assert_eq!(render.status, "nothing deleted");

    session
        .dispatch(Action::Delete(Some(window("2023-05-01 10:30:11", "2023-05-01 10:30:19"))))
        .unwrap();
    assert_eq!(session.intervals(), &before);
}

#[test]
fn toggle_view_shows_intervals_of_other_recordings() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    session
        .dispatch(Action::SelectRecording("2023_05_01_16_00_00".to_string()))
        .unwrap();
    session.dispatch(Action::WriteRegion(None)).unwrap();

    let render = session.dispatch(Action::SelectRecording(RECORDING.to_string())).unwrap();
    assert!(render.figure.unwrap().layout.shapes.is_empty());
    assert!(session.restrict_to_recording());

    let render = session.dispatch(Action::ToggleView).unwrap();
    assert!(!session.restrict_to_recording());
    assert_eq!(render.figure.unwrap().layout.shapes.len(), 1);

    session.dispatch(Action::ToggleView).unwrap();
    assert!(session.restrict_to_recording());
}

#[test]
fn save_persists_and_reselect_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    session
        .dispatch(Action::AddLabel(Some(window("2023-05-01 10:30:10", "2023-05-01 10:30:20"))))
        .unwrap();
    let render = session.dispatch(Action::Save).unwrap();
    assert!(render.figure.is_none());
    let saved = session.intervals().clone();

    let repo = FsIntervalRepository::new(dir.path().join("1_labeled"));
    assert_eq!(repo.load("p01").unwrap(), saved);

    session.dispatch(Action::WriteRegion(None)).unwrap();
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    assert_eq!(session.intervals(), &saved);
}

#[test]
fn switching_project_discards_unsaved_edits() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);
    session.dispatch(Action::WriteRegion(None)).unwrap();

    session.dispatch(Action::SelectProject("p02".to_string())).unwrap();
    assert!(session.intervals().is_empty());
    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    assert!(session.intervals().is_empty());
}

#[test]
fn save_before_any_project_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());

    let repo = FsIntervalRepository::new(dir.path().join("1_labeled"));
    let mut existing = IntervalSet::new();
    existing.append(
        IntervalKind::Label,
        Interval::new(ts("2023-05-01 10:30:10"), ts("2023-05-01 10:30:20")).unwrap(),
    );
    repo.save("p01", &existing).unwrap();

    let err = session.dispatch(Action::Save).unwrap_err();
    assert!(matches!(err, SessionError::NotLoaded));
    assert_eq!(repo.load("p01").unwrap(), existing);
}

#[test]
fn failed_project_load_blocks_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    std::fs::create_dir_all(dir.path().join("1_labeled/p02")).unwrap();
    std::fs::write(dir.path().join("1_labeled/p02/labels.json"), "corrupt").unwrap();

    session.dispatch(Action::SelectProject("p01".to_string())).unwrap();
    assert!(session.dispatch(Action::SelectProject("p02".to_string())).is_err());
    assert_eq!(session.project(), None);
    assert!(matches!(session.dispatch(Action::Save), Err(SessionError::NotLoaded)));
}

#[test]
fn describe_selection_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = fixture(dir.path());
    open_recording(&mut session);

    let render = session.dispatch(Action::DescribeSelection(None)).unwrap();
    assert_eq!(render.status, "No zoom action detected");
    assert!(render.figure.is_none());
    assert!(session.intervals().is_empty());
}
