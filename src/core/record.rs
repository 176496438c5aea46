//! The draft record - the entity under edit.
//!
//! ReleaseMeta: scalar release metadata
//! TemplateChoice: page template selection
//! ArtworkFile: pending artwork binary, never persisted
//! DraftRecord: metadata + three link lists + editor position

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::identity::{CreateToken, RecordId};
use super::link::{LinkFamily, LinkList};
use super::step::{recompute_validity, Step, StepValidity};

/// Scalar release metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMeta {
    pub title: String,
    pub artist: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub release_at: Option<OffsetDateTime>,
    /// Resolved artwork url (the upload service's output), if any.
    #[serde(default)]
    pub artwork_url: Option<String>,
}

/// Page template selection: identifier + display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateChoice {
    pub id: String,
    pub name: String,
}

impl TemplateChoice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Default for TemplateChoice {
    fn default() -> Self {
        Self::new("classic", "Classic")
    }
}

/// A not-yet-uploaded artwork binary held by the editor.
///
/// Deliberately not serializable: a binary handle from a previous session is
/// never reconstructable, so snapshots carry only the resolved
/// `artwork_url`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtworkFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Process-local flags. Never persisted, never overwritten by hydration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransientFlags {
    pub submitting: bool,
    pub loading: bool,
}

/// The draft under edit.
///
/// Mutated exclusively through [`crate::core::apply`]; serialization yields
/// the local-snapshot shape (transient fields stripped).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Remote identifier. `None` until the first successful create or a
    /// hydration from an existing remote record; first write wins and it is
    /// only ever cleared by a reset.
    #[serde(default)]
    pub record_id: Option<RecordId>,
    pub meta: ReleaseMeta,
    pub links: LinkList,
    pub socials: LinkList,
    pub contacts: LinkList,
    pub template: TemplateChoice,
    pub step: Step,
    pub validity: StepValidity,
    pub create_token: CreateToken,
    #[serde(skip)]
    pub artwork: Option<ArtworkFile>,
    #[serde(skip)]
    pub flags: TransientFlags,
}

impl DraftRecord {
    /// Empty draft with the built-in default template.
    pub fn new() -> Self {
        Self::with_template(TemplateChoice::default())
    }

    /// Empty draft with a substitute initial template.
    pub fn with_template(template: TemplateChoice) -> Self {
        let mut record = Self {
            record_id: None,
            meta: ReleaseMeta::default(),
            links: LinkList::new(),
            socials: LinkList::new(),
            contacts: LinkList::new(),
            template,
            step: Step::default(),
            validity: StepValidity::default(),
            create_token: CreateToken::generate(),
            artwork: None,
            flags: TransientFlags::default(),
        };
        recompute_validity(&mut record);
        record
    }

    pub fn list(&self, family: LinkFamily) -> &LinkList {
        match family {
            LinkFamily::Links => &self.links,
            LinkFamily::Socials => &self.socials,
            LinkFamily::Contacts => &self.contacts,
        }
    }

    pub(crate) fn list_mut(&mut self, family: LinkFamily) -> &mut LinkList {
        match family {
            LinkFamily::Links => &mut self.links,
            LinkFamily::Socials => &mut self.socials,
            LinkFamily::Contacts => &mut self.contacts,
        }
    }
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self::new()
    }
}
