//! Editor session facade.
//!
//! Owns the draft and wires the pieces together: dispatch feeds the
//! autosave scheduler, mount restores the local snapshot before remote
//! hydration, submit publishes, discard wipes. Every collaborator is
//! injected at construction - the engine never reads process-wide state.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::autosave::{Autosaver, DEFAULT_AUTOSAVE_DELAY, DEFAULT_SNAPSHOT_KEY};
use crate::core::{
    apply, can_submit, Action, ApplyOutcome, DraftRecord, RecordId, TemplateChoice,
};
use crate::hydrate::{DraftLoader, HydrationSource, LoadError, UserDefaults};
use crate::publish::{Publisher, SubmitError};
use crate::store::{PublishedRecord, RecordStore, SnapshotStore};

/// Session tunables.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Quiet period between the last edit and the snapshot write.
    pub autosave_delay: Duration,
    /// Local snapshot key.
    pub snapshot_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

/// One editing session over one draft.
pub struct EditorSession {
    record: DraftRecord,
    autosaver: Autosaver,
    loader: DraftLoader,
    publisher: Publisher,
}

impl EditorSession {
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        records: Arc<dyn RecordStore>,
        defaults: UserDefaults,
    ) -> Self {
        Self::with_config(snapshots, records, defaults, SessionConfig::default())
    }

    pub fn with_config(
        snapshots: Arc<dyn SnapshotStore>,
        records: Arc<dyn RecordStore>,
        defaults: UserDefaults,
        config: SessionConfig,
    ) -> Self {
        Self {
            record: DraftRecord::new(),
            autosaver: Autosaver::with_config(snapshots, config.autosave_delay, config.snapshot_key),
            loader: DraftLoader::new(records.clone(), defaults),
            publisher: Publisher::new(records),
        }
    }

    /// Current draft state.
    pub fn record(&self) -> &DraftRecord {
        &self.record
    }

    pub fn can_submit(&self) -> bool {
        can_submit(&self.record)
    }

    /// Editor entry: restore the local snapshot first (latest local edits
    /// before the network responds), then hydrate from remote + defaults.
    ///
    /// A hydration failure still leaves the locally-restored draft in
    /// place; the caller shows an error indicator and may retry.
    pub fn mount(&mut self, id: Option<RecordId>) -> Result<HydrationSource, LoadError> {
        if let Some(patch) = self.autosaver.restore() {
            apply(&mut self.record, Action::LoadDraft(Box::new(patch)));
            tracing::debug!("draft restored from local snapshot");
        }
        // Prefer an explicit id; fall back to one the snapshot carried.
        let id = id.or_else(|| self.record.record_id.clone());
        let source = self.loader.hydrate(&mut self.record, id.as_ref())?;
        // Keep the snapshot converged with hydrated state; the digest check
        // turns this into a no-op when nothing changed.
        self.autosaver.note_change();
        Ok(source)
    }

    /// Apply a user action. Dirty outcomes restart the autosave quiet
    /// period.
    pub fn dispatch(&mut self, action: Action) -> ApplyOutcome {
        let outcome = apply(&mut self.record, action);
        if outcome.dirty {
            self.autosaver.note_change();
        }
        outcome
    }

    /// Receiver of autosave timer ticks. Select on it in the driving loop
    /// and call [`EditorSession::poll_autosave`] when it fires.
    pub fn autosave_ticks(&self) -> Receiver<()> {
        self.autosaver.ticks()
    }

    /// Handle an autosave tick; returns true when a flush ran.
    pub fn poll_autosave(&mut self) -> bool {
        self.autosaver.on_tick(&self.record)
    }

    /// Write the snapshot immediately (editor teardown).
    pub fn flush_now(&mut self) {
        self.autosaver.flush(&self.record);
    }

    /// Publish the draft. On success the snapshot is refreshed so a reload
    /// resumes from the published record.
    pub fn submit(&mut self) -> Result<PublishedRecord, SubmitError> {
        let published = self.publisher.submit(&mut self.record)?;
        self.autosaver.flush(&self.record);
        Ok(published)
    }

    /// Drop the draft: clear the local snapshot and reset to empty,
    /// optionally substituting the initial template.
    pub fn discard(&mut self, template: Option<TemplateChoice>) {
        self.autosaver.clear();
        apply(&mut self.record, Action::Reset { template });
        tracing::debug!("draft discarded");
    }
}
