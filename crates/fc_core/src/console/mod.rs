//! The live match console: clock engine, statistics ledger, action
//! history, phase state machine, assignment board and the session facade
//! that keeps them consistent with each other.

pub mod assignments;
pub mod clock;
pub mod history;
pub mod ledger;
pub mod pending;
pub mod phase;
pub mod session;
pub mod signals;

pub use assignments::{AssignmentBoard, AssignmentChange, InputMode};
pub use clock::{wall_clock_ms, MatchClock, TimeAccount, TimeSheet};
pub use history::ActionHistory;
pub use ledger::{ApplyOutcome, FoulCounters, StatEntry, StatSheet, TimeoutUsage, FOUL_BONUS_LIMIT};
pub use pending::{
    ConfirmOutcome, GuardedOp, PendingConfirmation, PendingGate, RosterWatchdog, CONFIRM_TTL_MS,
    LINEUP_WARNING_DEBOUNCE_MS,
};
pub use phase::MatchPhase;
pub use session::{MatchSession, SubmitError};
pub use signals::{ConsoleSignal, SignalQueue};
