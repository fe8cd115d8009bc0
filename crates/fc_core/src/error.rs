use thiserror::Error;

use crate::console::phase::MatchPhase;
use crate::models::{EntityRef, Period, TeamSide};

/// Validation-class failures surfaced to the operator.
///
/// Every variant leaves console state exactly as it was; callers show the
/// message and carry on. Expected edge cases (undo on an empty history,
/// starting a running clock) are no-ops rather than errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("cannot transition from {from:?} to {to:?}")]
    InvalidTransition { from: MatchPhase, to: MatchPhase },

    #[error("lineup incomplete: {found} of {expected} positions assigned")]
    LineupIncomplete { expected: u8, found: u8 },

    #[error("aborting a match requires a reason")]
    MissingAbortReason,

    #[error("no actions recorded yet; confirm to finish anyway")]
    NothingRecorded,

    #[error("unknown entity {0} for this match")]
    UnknownEntity(EntityRef),

    #[error("{team:?} already used their timeout in period {}", .period.number())]
    TimeoutExhausted { team: TeamSide, period: Period },

    #[error("clock is locked during {0:?}")]
    ClockLocked(MatchPhase),

    #[error("recording is closed during {0:?}")]
    RecordingClosed(MatchPhase),

    #[error("{0} cannot occupy a home pitch position")]
    NotAssignable(EntityRef),

    #[error("{0:?} is recorded through its dedicated operation")]
    DedicatedOperation(crate::models::ActionType),

    #[error("score for {team:?} is already zero")]
    ScoreAtFloor { team: TeamSide },

    #[error("score correction delta cannot be zero")]
    EmptyCorrection,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
