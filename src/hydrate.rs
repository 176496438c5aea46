//! Draft hydration from the remote record and profile defaults.
//!
//! On editor entry the draft is first restored from the local snapshot
//! (see [`crate::autosave`]), then hydrated here: the remote record is the
//! higher-precedence source, profile defaults fill what the remote record
//! lacks, and fields neither supplies are left as the restore/built-in
//! default left them. Precedence holds independently per field.

use std::sync::Arc;

use thiserror::Error;

use crate::core::{apply, Action, DraftPatch, DraftRecord, LinkEntry, LinkList, RecordId};
use crate::error::{Effect, Transience};
use crate::store::{PublishedRecord, RecordStore, StoreError};

/// Profile-level defaults supplied by the surrounding application at
/// construction time (never read from ambient state).
#[derive(Clone, Debug, Default)]
pub struct UserDefaults {
    pub links: Vec<LinkEntry>,
    pub socials: Vec<LinkEntry>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("remote fetch for {id} failed")]
    Fetch {
        id: RecordId,
        #[source]
        source: StoreError,
    },
}

impl LoadError {
    pub fn transience(&self) -> Transience {
        match self {
            LoadError::Fetch { source, .. } => source.transience(),
        }
    }

    pub fn effect(&self) -> Effect {
        // Fetch is read-only.
        Effect::None
    }
}

/// Where the initial draft content came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrationSource {
    /// An existing remote record was found and merged.
    Remote,
    /// No remote record; profile defaults (and built-ins) seeded the draft.
    Defaults,
}

/// Merges remote state and profile defaults into the draft.
pub struct DraftLoader {
    store: Arc<dyn RecordStore>,
    defaults: UserDefaults,
}

impl DraftLoader {
    pub fn new(store: Arc<dyn RecordStore>, defaults: UserDefaults) -> Self {
        Self { store, defaults }
    }

    /// Hydrate the draft from remote + defaults.
    ///
    /// A missing remote row is "no remote record", not an error. The
    /// `loading` flag is set for the duration and cleared on every exit
    /// path; transient flags are never part of the merged payload.
    pub fn hydrate(
        &self,
        record: &mut DraftRecord,
        id: Option<&RecordId>,
    ) -> Result<HydrationSource, LoadError> {
        apply(record, Action::SetLoading(true));

        let fetched = match id {
            Some(id) => match self.store.fetch(id) {
                Ok(found) => {
                    if found.is_none() {
                        tracing::debug!(%id, "remote record not found, treating as new draft");
                    }
                    found
                }
                Err(source) => {
                    apply(record, Action::SetLoading(false));
                    return Err(LoadError::Fetch {
                        id: id.clone(),
                        source,
                    });
                }
            },
            None => None,
        };

        let source = if fetched.is_some() {
            HydrationSource::Remote
        } else {
            HydrationSource::Defaults
        };
        let patch = self.merge_patch(fetched);
        apply(record, Action::LoadDraft(Box::new(patch)));
        apply(record, Action::SetLoading(false));
        tracing::debug!(?source, "draft hydrated");
        Ok(source)
    }

    /// Field-by-field merge: remote if present, else profile default.
    /// Absent on both sides means the field stays out of the patch.
    fn merge_patch(&self, remote: Option<PublishedRecord>) -> DraftPatch {
        let mut patch = DraftPatch::default();

        if !self.defaults.links.is_empty() {
            patch.links = Some(LinkList::from_entries(self.defaults.links.iter().cloned()));
        }
        if !self.defaults.socials.is_empty() {
            patch.socials = Some(LinkList::from_entries(
                self.defaults.socials.iter().cloned(),
            ));
        }

        let Some(remote) = remote else {
            return patch;
        };

        patch.record_id = Some(remote.id);
        if !remote.title.is_empty() {
            patch.title = Some(remote.title);
        }
        if !remote.artist.is_empty() {
            patch.artist = Some(remote.artist);
        }
        if remote.release_at.is_some() {
            patch.release_at = remote.release_at;
        }
        if remote.artwork_url.is_some() {
            patch.artwork_url = remote.artwork_url;
        }
        if !remote.links.is_empty() {
            patch.links = Some(remote.links);
        }
        if !remote.socials.is_empty() {
            patch.socials = Some(remote.socials);
        }
        if !remote.contacts.is_empty() {
            patch.contacts = Some(remote.contacts);
        }
        if let Some(template) = remote.template {
            patch.template = Some(template);
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::core::{LinkId, TemplateChoice};
    use crate::store::{MemoryRecordStore, RecordStatus};

    fn default_link(id: &str, category: &str) -> LinkEntry {
        LinkEntry::new(
            LinkId::new(id).unwrap(),
            category,
            format!("https://{category}.example/artist"),
            category,
        )
    }

    fn remote_record(id: &str) -> PublishedRecord {
        PublishedRecord {
            id: RecordId::new(id).unwrap(),
            title: "Midnight".into(),
            artist: String::new(),
            release_at: None,
            artwork_url: Some("https://cdn.example/a.png".into()),
            links: LinkList::new(),
            socials: LinkList::new(),
            contacts: LinkList::new(),
            template: Some(TemplateChoice::new("neon", "Neon")),
            status: RecordStatus::Published,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn loader(store: &Arc<MemoryRecordStore>, defaults: UserDefaults) -> DraftLoader {
        DraftLoader::new(store.clone() as Arc<dyn RecordStore>, defaults)
    }

    #[test]
    fn precedence_is_per_field() {
        // Remote has artwork but no links; defaults supply the links.
        let store = Arc::new(MemoryRecordStore::new());
        store.seed(remote_record("sl-1"));

        let defaults = UserDefaults {
            links: vec![default_link("d1", "spotify")],
            socials: vec![],
        };
        let loader = loader(&store, defaults);
        let mut record = DraftRecord::new();
        let id = RecordId::new("sl-1").unwrap();

        let source = loader.hydrate(&mut record, Some(&id)).unwrap();
        assert_eq!(source, HydrationSource::Remote);
        assert_eq!(
            record.meta.artwork_url.as_deref(),
            Some("https://cdn.example/a.png")
        );
        let ids: Vec<&str> = record.links.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["d1"]);
        assert_eq!(record.record_id, Some(id));
        assert_eq!(record.template.id, "neon");
    }

    #[test]
    fn empty_remote_field_does_not_clobber_local_edits() {
        // The remote record has no artist; a locally-restored value stays.
        let store = Arc::new(MemoryRecordStore::new());
        store.seed(remote_record("sl-1"));

        let loader = loader(&store, UserDefaults::default());
        let mut record = DraftRecord::new();
        apply(&mut record, Action::SetArtist("The Larks".into()));

        let id = RecordId::new("sl-1").unwrap();
        loader.hydrate(&mut record, Some(&id)).unwrap();
        assert_eq!(record.meta.artist, "The Larks");
        assert_eq!(record.meta.title, "Midnight");
    }

    #[test]
    fn missing_row_falls_back_to_defaults() {
        let store = Arc::new(MemoryRecordStore::new());
        let defaults = UserDefaults {
            links: vec![],
            socials: vec![default_link("s1", "instagram")],
        };
        let loader = loader(&store, defaults);
        let mut record = DraftRecord::new();
        let id = RecordId::new("sl-404").unwrap();

        let source = loader.hydrate(&mut record, Some(&id)).unwrap();
        assert_eq!(source, HydrationSource::Defaults);
        assert!(record.record_id.is_none());
        assert_eq!(record.socials.len(), 1);
        assert!(!record.flags.loading);
    }

    #[test]
    fn no_id_seeds_from_defaults_without_fetching() {
        let store = Arc::new(MemoryRecordStore::new());
        let loader = loader(
            &store,
            UserDefaults {
                links: vec![default_link("d1", "spotify")],
                socials: vec![],
            },
        );
        let mut record = DraftRecord::new();

        let source = loader.hydrate(&mut record, None).unwrap();
        assert_eq!(source, HydrationSource::Defaults);
        assert_eq!(store.counts().fetches, 0);
        assert_eq!(record.links.len(), 1);
    }

    #[test]
    fn fetch_failure_clears_loading_and_surfaces() {
        let store = Arc::new(MemoryRecordStore::new());
        store.fail_next(StoreError::Transport("connection reset".into()));

        let loader = loader(&store, UserDefaults::default());
        let mut record = DraftRecord::new();
        apply(&mut record, Action::SetTitle("Local".into()));

        let id = RecordId::new("sl-1").unwrap();
        let err = loader.hydrate(&mut record, Some(&id)).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
        assert!(err.transience().is_retryable());
        assert!(!record.flags.loading);
        // Draft left exactly as it was.
        assert_eq!(record.meta.title, "Local");
    }
}
