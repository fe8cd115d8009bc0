//! # fc_core - Live Futsal Match Console
//!
//! State machine behind the club's live match console: phase transitions,
//! a pausable game clock with per-player time accounting, an undoable
//! action log with derived statistics, per-half foul and timeout counters,
//! and incremental local persistence so an in-progress match survives a
//! reload.
//!
//! ## Design
//! - All state lives in an explicit [`console::MatchSession`]; there are
//!   no module-level globals.
//! - Every mutator takes the wall-clock sample as an argument, so reads
//!   are pure functions of "now" and the display layer may poll at any
//!   cadence.
//! - The action history is the single linearization of recorded events;
//!   the statistics ledger always equals the fold of the history.

pub mod backend;
pub mod console;
pub mod error;
pub mod models;
pub mod save;

pub use backend::{BackendError, BackendResult, MatchBackend};
pub use console::{ConsoleSignal, GuardedOp, MatchPhase, MatchSession, SubmitError};
pub use error::{ConsoleError, Result};
pub use models::{
    ActionRecord, ActionType, ConfirmedRoster, EntityRef, MatchReport, Period, PitchSlot,
    ScoreLine, StaffRole, TeamSide,
};
pub use save::{FileStore, MemoryStore, PersistError, ResumePlan, SnapshotKey, SnapshotStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // End-to-end pass over the public surface: open, play a short match,
    // reload, finish, report.
    #[test]
    fn test_console_full_match_flow() {
        let store = Arc::new(Mutex::new(MemoryStore::default()));
        let roster = ConfirmedRoster {
            players: (1..=6)
                .map(|id| models::RosterPlayer {
                    id,
                    display_name: format!("P{}", id),
                    number: id as u8,
                    position: None,
                })
                .collect(),
            staff: Vec::new(),
        };

        let mut session = MatchSession::open_fresh("liga-23", roster.clone(), Box::new(store.clone()));
        for (i, slot) in PitchSlot::ALL.iter().enumerate() {
            session.assign(EntityRef::Player(i as u32 + 1), *slot, 0).unwrap();
        }
        session.start_first_half(0).unwrap();
        session.start_clock(0).unwrap();
        session.record_action(EntityRef::Player(3), ActionType::Goal, 240_000).unwrap();
        session.record_action(EntityRef::Visitor(11), ActionType::Goal, 600_000).unwrap();

        // Reload mid-match.
        drop(session);
        let mut session = MatchSession::open_resumed("liga-23", roster, Box::new(store.clone()));
        assert_eq!(session.score(), ScoreLine { home: 1, away: 1 });

        session.begin_half_time(1_200_000).unwrap();
        session.begin_second_half(1_260_000).unwrap();
        session.record_action(EntityRef::Player(3), ActionType::Goal, 1_500_000).unwrap();
        session.finish_match(2_460_000, false).unwrap();

        let report = session.build_report(2_460_000);
        assert_eq!(report.score, ScoreLine { home: 2, away: 1 });
        assert_eq!(report.action_history.len(), 3);
        let p3 = report.players.iter().find(|p| p.id == 3).unwrap();
        assert_eq!(p3.goals, 2);
        // On pitch the whole 20 + 20 minutes of played clock time.
        assert_eq!(p3.minutes_played, 40);
    }
}
