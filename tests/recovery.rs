//! Failure-mode tests: partial saves, stale writes, duplicate submissions,
//! and snapshot recovery.

mod fixtures;

use std::time::Duration;

use smartlink::{
    Action, Effect, LoadError, RecordId, SnapshotStore, StoreError, SubmitError, UserDefaults,
    WriteOp, DEFAULT_SNAPSHOT_KEY,
};

use crate::fixtures::{fill_release_form, session, stores};

#[test]
fn rapid_edits_collapse_into_one_snapshot_write() {
    let (snapshots, records) = stores();
    let mut session = session(&snapshots, &records, UserDefaults::default(), 30);

    for title in ["M", "Mi", "Mid", "Midnight"] {
        session.dispatch(Action::SetTitle(title.into()));
        std::thread::sleep(Duration::from_millis(3));
    }
    std::thread::sleep(Duration::from_millis(40));

    let ticks = session.autosave_ticks();
    let mut flushed = 0;
    while ticks.try_recv().is_ok() {
        if session.poll_autosave() {
            flushed += 1;
        }
    }

    assert_eq!(flushed, 1);
    assert_eq!(snapshots.writes(), 1);
    let raw = snapshots.get(DEFAULT_SNAPSHOT_KEY).unwrap().unwrap();
    assert!(raw.contains("Midnight"));
    assert!(!raw.contains("\"Mid\""));
}

#[test]
fn failed_submit_preserves_edits_for_retry() {
    let (snapshots, records) = stores();
    let mut session = session(&snapshots, &records, UserDefaults::default(), 10);

    fill_release_form(&mut session);
    records.fail_next(StoreError::Transport("connection reset".into()));

    let err = session.submit().unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Store {
            op: WriteOp::Create,
            ..
        }
    ));
    assert_eq!(err.effect(), Effect::Unknown);

    // Nothing was cleared; the retry succeeds.
    assert_eq!(session.record().meta.title, "Midnight");
    assert!(!session.record().flags.submitting);
    assert!(session.can_submit());
    let published = session.submit().unwrap();
    assert_eq!(session.record().record_id, Some(published.id));
    assert_eq!(records.counts().inserts, 2);
}

#[test]
fn update_of_vanished_record_is_stale() {
    let (snapshots, records) = stores();
    let mut session = session(&snapshots, &records, UserDefaults::default(), 10);

    fill_release_form(&mut session);
    let published = session.submit().unwrap();
    records.evict(&published.id);

    let err = session.submit().unwrap_err();
    assert!(matches!(err, SubmitError::Stale { .. }));
}

#[test]
fn hydration_failure_keeps_locally_restored_draft() {
    let (snapshots, records) = stores();

    {
        let mut first = session(&snapshots, &records, UserDefaults::default(), 10);
        fill_release_form(&mut first);
        first.dispatch(Action::SetRecordId(RecordId::new("sl-9").unwrap()));
        first.flush_now();
    }

    records.fail_next(StoreError::Transport("dns failure".into()));
    let mut second = session(&snapshots, &records, UserDefaults::default(), 10);
    let err = second.mount(None).unwrap_err();
    assert!(matches!(err, LoadError::Fetch { .. }));

    // Local edits survived the failed load and the flag is back down.
    assert_eq!(second.record().meta.title, "Midnight");
    assert!(!second.record().flags.loading);
}

#[test]
fn corrupt_snapshot_falls_back_to_clean_mount() {
    let (snapshots, records) = stores();
    snapshots.set(DEFAULT_SNAPSHOT_KEY, "{\"truncated\":").unwrap();

    let mut session = session(&snapshots, &records, UserDefaults::default(), 10);
    session.mount(None).unwrap();
    assert!(session.record().meta.title.is_empty());
    assert!(session.record().record_id.is_none());
}

#[test]
fn snapshot_write_failure_never_blocks_editing() {
    // A session over a file store pointed at an unwritable path: flushes
    // warn and editing continues.
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("not_a_dir");
    std::fs::write(&file_path, b"occupied").unwrap();

    let snapshots = std::sync::Arc::new(smartlink::store::FileSnapshotStore::new(
        file_path.join("nested"),
    ));
    let records = std::sync::Arc::new(smartlink::MemoryRecordStore::new());
    let mut session = smartlink::EditorSession::new(
        snapshots,
        records,
        UserDefaults::default(),
    );

    session.dispatch(Action::SetTitle("Midnight".into()));
    session.flush_now();
    session.dispatch(Action::SetArtist("The Larks".into()));
    assert_eq!(session.record().meta.artist, "The Larks");
}
