//! Editor actions and the shallow-merge draft patch.
//!
//! One action per user gesture or system event. Applied through
//! [`super::apply::apply`], which is total - an action that targets a
//! missing entry is a no-op, never an error.

use time::OffsetDateTime;

use super::identity::{CreateToken, LinkId, RecordId};
use super::link::{LinkEntry, LinkFamily, LinkList, LinkPatch};
use super::record::{ArtworkFile, TemplateChoice};
use super::step::Step;

/// Tagged draft transition.
#[derive(Clone, Debug)]
pub enum Action {
    SetTitle(String),
    SetArtist(String),
    SetReleaseAt(Option<OffsetDateTime>),
    /// Resolved artwork url from the upload service.
    SetArtworkUrl(Option<String>),
    SetTemplate(TemplateChoice),
    SetStep(Step),
    /// Cache a step's validity. The stored flag is `valid && predicate`, so
    /// a hand-set `true` can never override a failing predicate.
    SetStepValidity { step: Step, valid: bool },
    AddLink {
        family: LinkFamily,
        entry: LinkEntry,
    },
    RemoveLink {
        family: LinkFamily,
        id: LinkId,
    },
    UpdateLink {
        family: LinkFamily,
        id: LinkId,
        patch: LinkPatch,
    },
    /// Pending artwork binary held until upload resolves.
    SetArtwork(Option<ArtworkFile>),
    SetSubmitting(bool),
    SetLoading(bool),
    /// Adopt a remote identifier. First write wins; a draft that already has
    /// one keeps it.
    SetRecordId(RecordId),
    /// Shallow merge: present fields overwrite, absent fields are left
    /// untouched. The pending artwork binary is always dropped.
    LoadDraft(Box<DraftPatch>),
    /// Restore the empty draft, optionally substituting the initial
    /// template. Mints a fresh create token.
    Reset { template: Option<TemplateChoice> },
}

impl Action {
    /// Whether this action can move a step predicate's inputs.
    pub(crate) fn affects_validity(&self) -> bool {
        matches!(
            self,
            Action::SetTitle(_)
                | Action::SetArtist(_)
                | Action::SetReleaseAt(_)
                | Action::SetArtworkUrl(_)
                | Action::SetTemplate(_)
                | Action::AddLink { .. }
                | Action::RemoveLink { .. }
                | Action::UpdateLink { .. }
                | Action::LoadDraft(_)
                | Action::Reset { .. }
        )
    }
}

/// Partial draft for `LoadDraft`.
///
/// Built by the hydration merge and by the local-snapshot restore path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftPatch {
    pub record_id: Option<RecordId>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub release_at: Option<OffsetDateTime>,
    pub artwork_url: Option<String>,
    pub links: Option<LinkList>,
    pub socials: Option<LinkList>,
    pub contacts: Option<LinkList>,
    pub template: Option<TemplateChoice>,
    pub step: Option<Step>,
    pub create_token: Option<CreateToken>,
}

impl From<&super::record::DraftRecord> for DraftPatch {
    /// Full patch carrying every persisted field - the snapshot restore
    /// shape.
    fn from(record: &super::record::DraftRecord) -> Self {
        Self {
            record_id: record.record_id.clone(),
            title: Some(record.meta.title.clone()),
            artist: Some(record.meta.artist.clone()),
            release_at: record.meta.release_at,
            artwork_url: record.meta.artwork_url.clone(),
            links: Some(record.links.clone()),
            socials: Some(record.socials.clone()),
            contacts: Some(record.contacts.clone()),
            template: Some(record.template.clone()),
            step: Some(record.step),
            create_token: Some(record.create_token),
        }
    }
}
