//! Storage seams: local snapshot store and remote record store.
//!
//! Both are injected collaborators. The engine owns no wire format beyond
//! what these traits require; the remote payload shape follows the record
//! store's schema.

pub mod remote;
pub mod snapshot;

pub use remote::{
    MemoryRecordStore, PublishedRecord, RecordPayload, RecordStatus, RecordStore, StoreCounts,
    StoreError,
};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};
