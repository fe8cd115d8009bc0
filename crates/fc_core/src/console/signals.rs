//! Transient notifications for the presentation layer.

use uuid::Uuid;

use crate::models::{ActionType, Period, TeamSide};
use crate::save::SnapshotKey;

use super::pending::GuardedOp;

/// Informational pulses queued by core mutations.
///
/// Signals carry no authority: dropping them loses nothing but UI flashes.
/// The presentation layer drains the queue at its own cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleSignal {
    /// Highlight the freshly recorded action.
    ActionFlash { action_id: Uuid, action: ActionType },
    /// A team just reached the foul bonus for the given half.
    FoulBonus { team: TeamSide, period: Period },
    /// Live lineup has been short of five players past the debounce.
    MissingPlayers { assigned: u8 },
    /// A proposed risky operation expired unconfirmed.
    PendingExpired { op: GuardedOp },
    /// A persisted slice could not be restored and fell back to defaults.
    SliceSalvaged { key: SnapshotKey },
}

#[derive(Debug, Clone, Default)]
pub struct SignalQueue {
    queued: Vec<ConsoleSignal>,
}

impl SignalQueue {
    pub fn push(&mut self, signal: ConsoleSignal) {
        self.queued.push(signal);
    }

    /// Hand the queued signals over, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<ConsoleSignal> {
        std::mem::take(&mut self.queued)
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}
