//! Remote record store interface and in-memory reference implementation.
//!
//! All writes are replace-by-id, never a partial patch, so overlapping
//! writes converge last-write-wins. Field names here are the record store's
//! schema - an external contract.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::{CreateToken, LinkList, RecordId, TemplateChoice};
use crate::error::{Effect, Transience};

/// Publication state of a remote record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Draft,
    Published,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// Outbound record payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub title: String,
    pub artist: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub release_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    pub links: LinkList,
    pub socials: LinkList,
    pub contacts: LinkList,
    pub template: TemplateChoice,
    pub status: RecordStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Present on creates only; lets the backend deduplicate retries.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub create_token: Option<CreateToken>,
}

/// Remote record as returned by the store. Server-assigned id and
/// timestamps are authoritative over local guesses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishedRecord {
    pub id: RecordId,
    pub title: String,
    pub artist: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub release_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub links: LinkList,
    #[serde(default)]
    pub socials: LinkList,
    #[serde(default)]
    pub contacts: LinkList,
    #[serde(default)]
    pub template: Option<TemplateChoice>,
    pub status: RecordStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Remote store failure with retry classification.
#[derive(Clone, Debug, Error)]
pub enum StoreError {
    /// The request never demonstrably reached the backend.
    #[error("transport: {0}")]
    Transport(String),
    /// The backend rejected or failed the request.
    #[error("backend: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn transience(&self) -> Transience {
        match self {
            StoreError::Transport(_) => Transience::Retryable,
            StoreError::Backend(_) => Transience::Unknown,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            // A lost response does not mean a lost write.
            StoreError::Transport(_) => Effect::Unknown,
            StoreError::Backend(_) => Effect::Unknown,
        }
    }
}

/// Remote record store. Single-shot requests, no pagination.
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when the id does not exist - not an error.
    fn fetch(&self, id: &RecordId) -> Result<Option<PublishedRecord>, StoreError>;
    /// Insert a new record; the store assigns the id.
    fn insert(&self, payload: &RecordPayload) -> Result<PublishedRecord, StoreError>;
    /// Replace an existing record. `Ok(None)` when the row no longer exists.
    fn update(
        &self,
        id: &RecordId,
        payload: &RecordPayload,
    ) -> Result<Option<PublishedRecord>, StoreError>;
}

/// Request counts observed by [`MemoryRecordStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub fetches: u32,
    pub inserts: u32,
    pub updates: u32,
}

/// In-memory record store: reference implementation and test double.
///
/// Supports one-shot failure injection and request counting.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    records: BTreeMap<RecordId, PublishedRecord>,
    next_id: u32,
    counts: StoreCounts,
    fail_next: Option<StoreError>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> StoreCounts {
        self.inner.lock().expect("record store lock").counts
    }

    /// Fail the next request with `err`, then recover.
    pub fn fail_next(&self, err: StoreError) {
        self.inner.lock().expect("record store lock").fail_next = Some(err);
    }

    /// Seed a record (hydration and stale-update tests).
    pub fn seed(&self, record: PublishedRecord) {
        let mut inner = self.inner.lock().expect("record store lock");
        inner.records.insert(record.id.clone(), record);
    }

    /// Drop a record out from under the client.
    pub fn evict(&self, id: &RecordId) {
        let mut inner = self.inner.lock().expect("record store lock");
        inner.records.remove(id);
    }

    pub fn get(&self, id: &RecordId) -> Option<PublishedRecord> {
        let inner = self.inner.lock().expect("record store lock");
        inner.records.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("record store lock").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn take_failure(inner: &mut StoreInner) -> Result<(), StoreError> {
    match inner.fail_next.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn record_from_payload(
    id: RecordId,
    payload: &RecordPayload,
    created_at: OffsetDateTime,
) -> PublishedRecord {
    PublishedRecord {
        id,
        title: payload.title.clone(),
        artist: payload.artist.clone(),
        release_at: payload.release_at,
        artwork_url: payload.artwork_url.clone(),
        links: payload.links.clone(),
        socials: payload.socials.clone(),
        contacts: payload.contacts.clone(),
        template: Some(payload.template.clone()),
        status: payload.status,
        created_at,
        updated_at: payload.updated_at,
    }
}

impl RecordStore for MemoryRecordStore {
    fn fetch(&self, id: &RecordId) -> Result<Option<PublishedRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("record store lock");
        inner.counts.fetches += 1;
        take_failure(&mut inner)?;
        Ok(inner.records.get(id).cloned())
    }

    fn insert(&self, payload: &RecordPayload) -> Result<PublishedRecord, StoreError> {
        let mut inner = self.inner.lock().expect("record store lock");
        inner.counts.inserts += 1;
        take_failure(&mut inner)?;

        inner.next_id += 1;
        let id = RecordId::new(format!("sl-{}", inner.next_id)).expect("generated id non-empty");
        let record = record_from_payload(id.clone(), payload, OffsetDateTime::now_utc());
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    fn update(
        &self,
        id: &RecordId,
        payload: &RecordPayload,
    ) -> Result<Option<PublishedRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("record store lock");
        inner.counts.updates += 1;
        take_failure(&mut inner)?;

        let Some(existing) = inner.records.get(id) else {
            return Ok(None);
        };
        let record = record_from_payload(id.clone(), payload, existing.created_at);
        inner.records.insert(id.clone(), record.clone());
        Ok(Some(record))
    }
}
