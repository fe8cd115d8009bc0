//! Snapshot slice shapes and the session-open decision.

use serde::{Deserialize, Serialize};

use crate::backend::MatchBackend;
use crate::console::clock::TimeAccount;
use crate::console::ledger::{FoulCounters, StatEntry};
use crate::console::phase::MatchPhase;
use crate::models::{ActionRecord, EntityRef, Period, ScoreLine};

use super::error::PersistError;
use super::format::decode_slice;
use super::store::{SnapshotKey, SnapshotStore};

/// Persisted shape of the phase slice. Period travels alongside the phase
/// because an aborted match does not encode which half it died in.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PhaseSlice {
    pub phase: MatchPhase,
    pub period: Period,
}

/// Persisted shape of the per-entity time accounts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimeAccountsSlice {
    pub entries: Vec<(EntityRef, TimeAccount)>,
}

/// Persisted shape of score, stat entries and foul counters.
///
/// This slice is a convenience mirror: hydration rebuilds the ledger by
/// replaying the history slice and only falls back to these numbers when
/// the history itself cannot be restored.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CountersSlice {
    pub entries: Vec<(EntityRef, StatEntry)>,
    pub score: ScoreLine,
    pub fouls: FoulCounters,
}

/// Persisted shape of the action history.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HistorySlice {
    pub records: Vec<ActionRecord>,
}

/// The one path taken when a console session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePlan {
    /// No local data: initialize a fresh console.
    Fresh,
    /// Local slices exist: offer to pick up the in-progress match.
    OfferHydrate,
    /// The backend already holds a finalized report: offer to reset the
    /// stale local data instead of resuming.
    OfferReset,
}

/// Decide how a session for `match_id` should open.
///
/// A backend failure is tolerated here: the probe degrades to the local
/// evidence so the console stays usable courtside without connectivity.
pub fn probe(match_id: &str, store: &dyn SnapshotStore, backend: &dyn MatchBackend) -> ResumePlan {
    match backend.report_exists(match_id) {
        Ok(true) => return ResumePlan::OfferReset,
        Ok(false) => {}
        Err(err) => {
            log::warn!("report-exists probe failed for {}: {}", match_id, err);
        }
    }

    if store.any_present(match_id) {
        ResumePlan::OfferHydrate
    } else {
        ResumePlan::Fresh
    }
}

/// Read and decode one slice. `Ok(None)` means the slice was never
/// written; `Err` means it exists but cannot be restored.
pub fn read_slice<T: serde::de::DeserializeOwned>(
    store: &dyn SnapshotStore,
    match_id: &str,
    key: SnapshotKey,
) -> Result<Option<T>, PersistError> {
    match store.read(match_id, key)? {
        Some(bytes) => Ok(Some(decode_slice(&bytes)?)),
        None => Ok(None),
    }
}
