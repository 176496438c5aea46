#![forbid(unsafe_code)]

pub mod autosave;
pub mod core;
pub mod error;
pub mod hydrate;
pub mod publish;
pub mod session;
pub mod store;
pub mod telemetry;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::core::{
    apply, can_submit, Action, ApplyOutcome, ArtworkFile, CoreError, CreateToken, DraftPatch,
    DraftRecord, LinkEntry, LinkFamily, LinkId, LinkList, LinkPatch, RecordId, ReleaseMeta, Step,
    StepValidity, TemplateChoice, TransientFlags,
};

pub use crate::autosave::{Autosaver, DEFAULT_AUTOSAVE_DELAY, DEFAULT_SNAPSHOT_KEY};
pub use crate::hydrate::{DraftLoader, HydrationSource, LoadError, UserDefaults};
pub use crate::publish::{Publisher, SubmitError, WriteOp};
pub use crate::session::{EditorSession, SessionConfig};
pub use crate::store::{
    FileSnapshotStore, MemoryRecordStore, MemorySnapshotStore, PublishedRecord, RecordPayload,
    RecordStatus, RecordStore, SnapshotError, SnapshotStore, StoreCounts, StoreError,
};
