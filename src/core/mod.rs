//! Core domain types for the draft engine
//!
//! Module hierarchy follows type dependency order:
//! - identity: RecordId, LinkId, CreateToken
//! - link: LinkEntry, LinkList, LinkFamily
//! - step: Step, StepValidity, submit gate
//! - record: ReleaseMeta, TemplateChoice, DraftRecord
//! - action: Action, DraftPatch
//! - apply: the transition function

pub mod action;
pub mod apply;
pub mod error;
pub mod identity;
pub mod link;
pub mod record;
pub mod step;

pub use action::{Action, DraftPatch};
pub use apply::{apply, ApplyOutcome};
pub use error::{CoreError, InvalidId};
pub use identity::{CreateToken, LinkId, RecordId};
pub use link::{LinkEntry, LinkFamily, LinkList, LinkPatch};
pub use record::{ArtworkFile, DraftRecord, ReleaseMeta, TemplateChoice, TransientFlags};
pub use step::{can_submit, recompute_validity, unsatisfied_mandatory, Step, StepValidity};
