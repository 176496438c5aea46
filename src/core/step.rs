//! Editor steps and their validity predicates.
//!
//! Each step of the multi-step editor has a pure predicate over the draft.
//! Validity is recomputed from the predicates whenever a relevant field
//! changes - the cached flags are never trusted from a hand-set `true`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::DraftRecord;

/// One page of the multi-step editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Basics,
    Links,
    Appearance,
    Review,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Basics, Step::Links, Step::Appearance, Step::Review];

    /// Steps that must be satisfied before the draft may be published.
    /// `Appearance` and `Review` gate navigation only.
    pub const MANDATORY: [Step; 2] = [Step::Basics, Step::Links];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basics => "basics",
            Self::Links => "links",
            Self::Appearance => "appearance",
            Self::Review => "review",
        }
    }

    /// 1-based position in the editor flow.
    pub fn number(&self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Links => 2,
            Self::Appearance => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.into_iter().find(|step| step.number() == n)
    }

    /// Pure predicate: is this step's form content complete?
    ///
    /// Never mutates, never performs I/O.
    pub fn is_satisfied(&self, record: &DraftRecord) -> bool {
        match self {
            Self::Basics => {
                !record.meta.title.trim().is_empty()
                    && !record.meta.artist.trim().is_empty()
                    && record.meta.release_at.is_some()
            }
            Self::Links => record.links.any_with_url(),
            Self::Appearance => !record.template.id.trim().is_empty(),
            Self::Review => true,
        }
    }
}

/// Cached per-step validity flags.
///
/// Missing entries read as `false`; [`recompute_validity`] keeps the map in
/// lockstep with the predicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepValidity(BTreeMap<Step, bool>);

impl StepValidity {
    pub fn get(&self, step: Step) -> bool {
        self.0.get(&step).copied().unwrap_or(false)
    }

    /// Store a flag, returning true when it actually flipped.
    pub(crate) fn set(&mut self, step: Step, valid: bool) -> bool {
        self.0.insert(step, valid) != Some(valid)
    }
}

/// Recompute every step's validity from its predicate.
/// Returns true when any flag flipped.
pub fn recompute_validity(record: &mut DraftRecord) -> bool {
    let mut changed = false;
    for step in Step::ALL {
        let valid = step.is_satisfied(record);
        changed |= record.validity.set(step, valid);
    }
    changed
}

/// A draft may be published when every mandatory step's predicate holds.
///
/// Evaluated from the predicates directly, so the gate is never stale.
pub fn can_submit(record: &DraftRecord) -> bool {
    Step::MANDATORY
        .into_iter()
        .all(|step| step.is_satisfied(record))
}

/// Mandatory steps whose predicate currently fails, in editor order.
pub fn unsatisfied_mandatory(record: &DraftRecord) -> Vec<Step> {
    Step::MANDATORY
        .into_iter()
        .filter(|step| !step.is_satisfied(record))
        .collect()
}
