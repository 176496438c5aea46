//! Debounced local snapshotting.
//!
//! Provides:
//! - `AutosaveScheduler` - cancellable quiet-period timer
//! - `Autosaver` - best-effort snapshot writer/reader
//!
//! When the draft changes, we schedule a flush after a delay (default
//! 1000ms). If another change occurs before the timer fires, we reschedule.
//! This batches rapid keystrokes into a single snapshot write.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::core::{DraftPatch, DraftRecord};
use crate::store::SnapshotStore;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_SNAPSHOT_KEY: &str = "smartlink.draft.v1";

/// Quiet-period scheduler.
///
/// Every change replaces the pending deadline with `now + delay`, so the
/// flush fires only once edits go quiet. Ticks from superseded schedules
/// arrive early and are ignored by `should_fire`.
pub struct AutosaveScheduler {
    /// Pending flush deadline, if any.
    deadline: Option<Instant>,

    /// Quiet-period length.
    delay: Duration,

    /// Channel to send timer completions.
    timer_tx: Sender<()>,
}

impl AutosaveScheduler {
    /// Create a new scheduler.
    pub fn new(timer_tx: Sender<()>) -> Self {
        Self::with_delay(timer_tx, DEFAULT_AUTOSAVE_DELAY)
    }

    /// Create with a custom quiet period.
    pub fn with_delay(timer_tx: Sender<()>, delay: Duration) -> Self {
        AutosaveScheduler {
            deadline: None,
            delay,
            timer_tx,
        }
    }

    /// (Re)start the quiet period.
    pub fn schedule(&mut self) {
        let delay = self.delay;
        self.deadline = Some(Instant::now() + delay);

        // Spawn timer thread
        let tx = self.timer_tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            // Ignore send errors - receiver may have been dropped
            let _ = tx.send(());
        });
    }

    /// Check if the flush should fire.
    ///
    /// Returns true when a pending deadline has elapsed; removes it.
    pub fn should_fire(&mut self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.deadline = None;
                return true;
            }
        }
        false
    }

    /// Cancel the pending flush.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Check if a flush is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Serialized snapshot envelope.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
    record: &'a DraftRecord,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(with = "time::serde::rfc3339")]
    #[allow(dead_code)]
    saved_at: OffsetDateTime,
    record: DraftRecord,
}

/// Best-effort snapshot persistence over a [`SnapshotStore`].
///
/// Failures are logged and swallowed; autosave never blocks editing and
/// never touches the remote store.
pub struct Autosaver {
    store: Arc<dyn SnapshotStore>,
    key: String,
    scheduler: AutosaveScheduler,
    ticks: Receiver<()>,
    last_digest: Option<[u8; 32]>,
}

impl Autosaver {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_config(store, DEFAULT_AUTOSAVE_DELAY, DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_config(
        store: Arc<dyn SnapshotStore>,
        delay: Duration,
        key: impl Into<String>,
    ) -> Self {
        let (timer_tx, ticks) = channel::unbounded();
        Self {
            store,
            key: key.into(),
            scheduler: AutosaveScheduler::with_delay(timer_tx, delay),
            ticks,
            last_digest: None,
        }
    }

    /// Receiver of quiet-period ticks; select on it in the driving loop and
    /// call [`Autosaver::on_tick`] when it fires.
    pub fn ticks(&self) -> Receiver<()> {
        self.ticks.clone()
    }

    /// Note a persisted-field change: restart the quiet period.
    pub fn note_change(&mut self) {
        self.scheduler.schedule();
    }

    /// Handle a timer tick. Flushes (and returns true) only when the quiet
    /// period actually elapsed.
    pub fn on_tick(&mut self, record: &DraftRecord) -> bool {
        if !self.scheduler.should_fire() {
            return false;
        }
        self.flush(record);
        true
    }

    /// Serialize and write the snapshot now. Best-effort: failures warn.
    ///
    /// Skips the store write when the draft content is unchanged since the
    /// last flush.
    pub fn flush(&mut self, record: &DraftRecord) {
        self.scheduler.cancel();

        let digest = match record_digest(record) {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!("draft snapshot serialize failed: {err}");
                return;
            }
        };
        if self.last_digest == Some(digest) {
            tracing::trace!("draft unchanged since last snapshot, skipping write");
            return;
        }

        let envelope = SnapshotRef {
            saved_at: OffsetDateTime::now_utc(),
            record,
        };
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("draft snapshot serialize failed: {err}");
                return;
            }
        };

        match self.store.set(&self.key, &json) {
            Ok(()) => {
                self.last_digest = Some(digest);
                tracing::debug!(bytes = json.len(), "draft snapshot written");
            }
            Err(err) => {
                tracing::warn!("draft snapshot write failed: {err}");
            }
        }
    }

    /// Read the stored snapshot, if present and parseable.
    ///
    /// Read and parse failures are warned and treated as "no snapshot" -
    /// recovery is a convenience, not a guarantee.
    pub fn restore(&mut self) -> Option<DraftPatch> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("draft snapshot read failed: {err}");
                return None;
            }
        };
        let snapshot: Snapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("draft snapshot parse failed, starting clean: {err}");
                return None;
            }
        };
        // Seed the digest so an immediate flush of identical state is a
        // no-op.
        if let Ok(digest) = record_digest(&snapshot.record) {
            self.last_digest = Some(digest);
        }
        Some(DraftPatch::from(&snapshot.record))
    }

    /// Drop the stored snapshot and cancel any pending flush (discard).
    pub fn clear(&mut self) {
        self.scheduler.cancel();
        self.last_digest = None;
        if let Err(err) = self.store.remove(&self.key) {
            tracing::warn!("draft snapshot remove failed: {err}");
        }
    }
}

fn record_digest(record: &DraftRecord) -> Result<[u8; 32], serde_json::Error> {
    let bytes = serde_json::to_vec(record)?;
    Ok(Sha256::digest(&bytes).into())
}
