//! Create-or-update publication of a draft.
//!
//! The update-vs-insert branch is the idempotency boundary: once a draft has
//! a remote id, every further submit takes the update path and is safe to
//! retry. A failed create may or may not have landed remotely - the create
//! token on the payload lets a backend deduplicate the retry.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::{
    apply, unsatisfied_mandatory, Action, CreateToken, DraftRecord, RecordId, Step,
};
use crate::error::{Effect, Transience};
use crate::store::{PublishedRecord, RecordPayload, RecordStatus, RecordStore, StoreError};

/// Which write a submission attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
        })
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Mandatory steps are incomplete; nothing was sent.
    #[error("draft not ready to publish, incomplete steps: {steps:?}")]
    Validation { steps: Vec<Step> },

    /// A submission is already in flight.
    #[error("a submission is already in flight")]
    InFlight,

    /// Update targeted a record that no longer exists remotely.
    #[error("record {id} no longer exists remotely")]
    Stale { id: RecordId },

    /// The create/update write failed.
    #[error("publish {op} failed")]
    Store {
        op: WriteOp,
        #[source]
        source: StoreError,
    },
}

impl SubmitError {
    pub fn transience(&self) -> Transience {
        match self {
            SubmitError::Validation { .. } => Transience::Permanent,
            SubmitError::InFlight => Transience::Retryable,
            SubmitError::Stale { .. } => Transience::Permanent,
            SubmitError::Store { source, .. } => source.transience(),
        }
    }

    /// Whether the remote store may have been mutated despite the error.
    pub fn effect(&self) -> Effect {
        match self {
            SubmitError::Validation { .. } | SubmitError::InFlight => Effect::None,
            // The row was gone before we wrote anything.
            SubmitError::Stale { .. } => Effect::None,
            // A lost response does not mean a lost write; for creates this
            // is exactly the duplicate-record hazard the create token
            // exists for.
            SubmitError::Store { .. } => Effect::Unknown,
        }
    }
}

/// Publishes drafts to the remote record store.
pub struct Publisher {
    store: Arc<dyn RecordStore>,
}

impl Publisher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Publish the draft: update when it already has a remote id, create
    /// otherwise.
    ///
    /// All-or-nothing for the draft: on failure only the `submitting` flag
    /// is touched, so the user's edits survive for a retry. On a first
    /// successful create the server-assigned id is adopted; every later
    /// submit takes the update path.
    pub fn submit(&self, record: &mut DraftRecord) -> Result<PublishedRecord, SubmitError> {
        if record.flags.submitting {
            return Err(SubmitError::InFlight);
        }
        let incomplete = unsatisfied_mandatory(record);
        if !incomplete.is_empty() {
            return Err(SubmitError::Validation { steps: incomplete });
        }

        apply(record, Action::SetSubmitting(true));
        let result = self.write(record);
        apply(record, Action::SetSubmitting(false));

        let published = result?;
        // No-op on the update path: first write wins.
        apply(record, Action::SetRecordId(published.id.clone()));
        tracing::info!(id = %published.id, "draft published");
        Ok(published)
    }

    fn write(&self, record: &DraftRecord) -> Result<PublishedRecord, SubmitError> {
        match record.record_id.clone() {
            Some(id) => {
                let payload = build_payload(record, None);
                match self.store.update(&id, &payload) {
                    Ok(Some(published)) => Ok(published),
                    Ok(None) => Err(SubmitError::Stale { id }),
                    Err(source) => Err(SubmitError::Store {
                        op: WriteOp::Update,
                        source,
                    }),
                }
            }
            None => {
                let payload = build_payload(record, Some(record.create_token));
                self.store.insert(&payload).map_err(|source| SubmitError::Store {
                    op: WriteOp::Create,
                    source,
                })
            }
        }
    }
}

fn build_payload(record: &DraftRecord, create_token: Option<CreateToken>) -> RecordPayload {
    RecordPayload {
        title: record.meta.title.clone(),
        artist: record.meta.artist.clone(),
        release_at: record.meta.release_at,
        artwork_url: record.meta.artwork_url.clone(),
        links: record.links.clone(),
        socials: record.socials.clone(),
        contacts: record.contacts.clone(),
        template: record.template.clone(),
        status: RecordStatus::Published,
        updated_at: OffsetDateTime::now_utc(),
        create_token,
    }
}
