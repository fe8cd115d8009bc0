//! Match phase state machine.
//!
//! The enum carries the legal transition table; contextual guards (lineup
//! completeness, non-empty history, abort reason) are enforced by the
//! session methods that request a transition.

use serde::{Deserialize, Serialize};

/// Coarse stage of the match. Exactly one per session.
///
/// Transitions are one-directional; `Setup` can only be re-entered through
/// an explicit full reset.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    #[default]
    Setup,
    FirstHalf,
    HalfTime,
    SecondHalf,
    Finished,
    /// Match cut short; the operator must give a reason.
    Aborted {
        reason: String,
    },
}

impl MatchPhase {
    /// Phases during which play is running and the 5-player rule is
    /// monitored.
    pub fn is_live(&self) -> bool {
        matches!(self, MatchPhase::FirstHalf | MatchPhase::SecondHalf)
    }

    /// Whether the match has reached a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchPhase::Finished | MatchPhase::Aborted { .. })
    }

    /// The clock may only be driven between kickoff preparation and the
    /// final whistle.
    pub fn clock_allowed(&self) -> bool {
        matches!(
            self,
            MatchPhase::FirstHalf | MatchPhase::HalfTime | MatchPhase::SecondHalf
        )
    }

    /// Actions can be recorded during both halves and the interval.
    pub fn recording_allowed(&self) -> bool {
        matches!(
            self,
            MatchPhase::FirstHalf | MatchPhase::HalfTime | MatchPhase::SecondHalf
        )
    }

    /// Structural legality of a transition, ignoring contextual guards.
    pub fn can_transition_to(&self, next: &MatchPhase) -> bool {
        match (self, next) {
            (MatchPhase::Setup, MatchPhase::FirstHalf) => true,
            (MatchPhase::FirstHalf, MatchPhase::HalfTime) => true,
            (MatchPhase::HalfTime, MatchPhase::SecondHalf) => true,
            (MatchPhase::SecondHalf, MatchPhase::Finished) => true,
            // Aborting is available from anywhere short of the final
            // whistle.
            (from, MatchPhase::Aborted { .. }) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchPhase::Setup => "setup",
            MatchPhase::FirstHalf => "first_half",
            MatchPhase::HalfTime => "half_time",
            MatchPhase::SecondHalf => "second_half",
            MatchPhase::Finished => "finished",
            MatchPhase::Aborted { .. } => "aborted",
        }
    }
}
