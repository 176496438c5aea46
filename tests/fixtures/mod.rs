//! Shared helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use time::macros::datetime;

use smartlink::{
    Action, EditorSession, LinkEntry, LinkFamily, LinkId, MemoryRecordStore, MemorySnapshotStore,
    RecordStore, SessionConfig, SnapshotStore, UserDefaults,
};

pub fn stores() -> (Arc<MemorySnapshotStore>, Arc<MemoryRecordStore>) {
    (
        Arc::new(MemorySnapshotStore::new()),
        Arc::new(MemoryRecordStore::new()),
    )
}

pub fn session(
    snapshots: &Arc<MemorySnapshotStore>,
    records: &Arc<MemoryRecordStore>,
    defaults: UserDefaults,
    autosave_delay_ms: u64,
) -> EditorSession {
    EditorSession::with_config(
        snapshots.clone() as Arc<dyn SnapshotStore>,
        records.clone() as Arc<dyn RecordStore>,
        defaults,
        SessionConfig {
            autosave_delay: Duration::from_millis(autosave_delay_ms),
            ..SessionConfig::default()
        },
    )
}

pub fn link(id: &str, category: &str, url: &str) -> LinkEntry {
    LinkEntry::new(LinkId::new(id).unwrap(), category, url, category)
}

/// Fill the mandatory steps: basics + one service link.
pub fn fill_release_form(session: &mut EditorSession) {
    session.dispatch(Action::SetTitle("Midnight".into()));
    session.dispatch(Action::SetArtist("The Larks".into()));
    session.dispatch(Action::SetReleaseAt(Some(datetime!(2025-01-01 00:00 UTC))));
    session.dispatch(Action::AddLink {
        family: LinkFamily::Links,
        entry: link("l1", "spotify", "https://sptfy.example/x"),
    });
}
