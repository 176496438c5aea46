//! Deterministic action application into the draft record.
//!
//! `apply` is the only mutation path for a draft. It is total: every action
//! either changes state or is a no-op, and it never errors or panics.
//! Mutation happens in place, so sub-trees an action does not touch are
//! never rebuilt.

use super::action::{Action, DraftPatch};
use super::record::DraftRecord;
use super::step::recompute_validity;

/// What an application changed.
///
/// `dirty` means a persisted field moved and the draft should be
/// re-snapshotted; transient changes (flags, pending artwork) flip only
/// `changed`. A default outcome means the action was a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub changed: bool,
    pub dirty: bool,
}

impl ApplyOutcome {
    /// Record a persisted-field change.
    fn persisted(&mut self, changed: bool) {
        if changed {
            self.changed = true;
            self.dirty = true;
        }
    }

    /// Record a transient change (not snapshot-relevant).
    fn transient(&mut self, changed: bool) {
        if changed {
            self.changed = true;
        }
    }
}

/// Apply one action to the draft.
pub fn apply(record: &mut DraftRecord, action: Action) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    let revalidate = action.affects_validity();

    match action {
        Action::SetTitle(title) => {
            outcome.persisted(set_field(&mut record.meta.title, title));
        }
        Action::SetArtist(artist) => {
            outcome.persisted(set_field(&mut record.meta.artist, artist));
        }
        Action::SetReleaseAt(release_at) => {
            outcome.persisted(set_field(&mut record.meta.release_at, release_at));
        }
        Action::SetArtworkUrl(url) => {
            outcome.persisted(set_field(&mut record.meta.artwork_url, url));
        }
        Action::SetTemplate(template) => {
            outcome.persisted(set_field(&mut record.template, template));
        }
        Action::SetStep(step) => {
            outcome.persisted(set_field(&mut record.step, step));
        }
        Action::SetStepValidity { step, valid } => {
            let effective = valid && step.is_satisfied(record);
            outcome.persisted(record.validity.set(step, effective));
        }
        Action::AddLink { family, entry } => {
            outcome.persisted(record.list_mut(family).push(entry));
        }
        Action::RemoveLink { family, id } => {
            outcome.persisted(record.list_mut(family).remove(&id));
        }
        Action::UpdateLink { family, id, patch } => {
            outcome.persisted(record.list_mut(family).update(&id, patch));
        }
        Action::SetArtwork(artwork) => {
            outcome.transient(set_field(&mut record.artwork, artwork));
        }
        Action::SetSubmitting(submitting) => {
            outcome.transient(set_field(&mut record.flags.submitting, submitting));
        }
        Action::SetLoading(loading) => {
            outcome.transient(set_field(&mut record.flags.loading, loading));
        }
        Action::SetRecordId(id) => {
            // First write wins: hydration or the first successful create.
            if record.record_id.is_none() {
                record.record_id = Some(id);
                outcome.persisted(true);
            }
        }
        Action::LoadDraft(patch) => {
            apply_patch(record, *patch, &mut outcome);
            // A binary handle from a previous session is never
            // reconstructable.
            outcome.transient(set_field(&mut record.artwork, None));
        }
        Action::Reset { template } => {
            let fresh = match template {
                Some(template) => DraftRecord::with_template(template),
                None => DraftRecord::new(),
            };
            // A fresh create token makes this always a change.
            *record = fresh;
            outcome.persisted(true);
        }
    }

    if revalidate {
        outcome.persisted(recompute_validity(record));
    }

    outcome
}

fn set_field<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn apply_patch(record: &mut DraftRecord, patch: DraftPatch, outcome: &mut ApplyOutcome) {
    if let Some(id) = patch.record_id {
        if record.record_id.is_none() {
            record.record_id = Some(id);
            outcome.persisted(true);
        }
    }
    if let Some(title) = patch.title {
        outcome.persisted(set_field(&mut record.meta.title, title));
    }
    if let Some(artist) = patch.artist {
        outcome.persisted(set_field(&mut record.meta.artist, artist));
    }
    if let Some(release_at) = patch.release_at {
        outcome.persisted(set_field(&mut record.meta.release_at, Some(release_at)));
    }
    if let Some(artwork_url) = patch.artwork_url {
        outcome.persisted(set_field(&mut record.meta.artwork_url, Some(artwork_url)));
    }
    if let Some(links) = patch.links {
        outcome.persisted(set_field(&mut record.links, links));
    }
    if let Some(socials) = patch.socials {
        outcome.persisted(set_field(&mut record.socials, socials));
    }
    if let Some(contacts) = patch.contacts {
        outcome.persisted(set_field(&mut record.contacts, contacts));
    }
    if let Some(template) = patch.template {
        outcome.persisted(set_field(&mut record.template, template));
    }
    if let Some(step) = patch.step {
        outcome.persisted(set_field(&mut record.step, step));
    }
    if let Some(token) = patch.create_token {
        outcome.persisted(set_field(&mut record.create_token, token));
    }
}
