//! Local persistence: per-match snapshot slices mirrored after every
//! mutation so an in-progress match survives a reload.

pub mod error;
pub mod format;
pub mod snapshot;
pub mod store;

pub use error::PersistError;
pub use format::{decode_slice, encode_slice, SLICE_VERSION};
pub use snapshot::{probe, read_slice, CountersSlice, HistorySlice, PhaseSlice, ResumePlan,
    TimeAccountsSlice};
pub use store::{FileStore, MemoryStore, SnapshotKey, SnapshotStore};
