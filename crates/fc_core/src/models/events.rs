use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{EntityRef, Period, TeamSide};
use super::roster::PitchSlot;

/// Discrete occurrences the console records against an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Goal,
    Assist,
    Foul,
    YellowCard,
    RedCard,
    Save,
    Timeout,
    /// Operator-issued score correction; carries a signed delta.
    ScoreCorrection,
    /// Player entered the pitch (assigned to a slot).
    PitchEntry,
    /// Player left the pitch (slot vacated).
    PitchExit,
}

impl ActionType {
    /// Pitch movements feed time accounting rather than stat counters.
    #[inline]
    pub const fn is_pitch_movement(self) -> bool {
        matches!(self, ActionType::PitchEntry | ActionType::PitchExit)
    }
}

/// One entry of the action history.
///
/// Immutable once appended; the insertion order of the history is the
/// authoritative chronological order. The statistics ledger is always the
/// left-fold of `apply` over this sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub id: Uuid,
    /// Acting entity. `None` for team-level actions (timeouts, score
    /// corrections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,
    pub team: TeamSide,
    #[serde(rename = "type")]
    pub action: ActionType,
    pub period: Period,
    /// Whole minutes of match clock elapsed when the action was recorded.
    pub match_minute: u8,
    /// Wall-clock unix milliseconds at record time.
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ActionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActionDetail {
    /// Slot involved in a pitch entry/exit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<PitchSlot>,
    /// Free-text annotation (timeout reason, manual adjustment note).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Signed score delta for corrections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i8>,
}

impl ActionDetail {
    pub fn for_slot(slot: PitchSlot) -> Self {
        Self { slot: Some(slot), ..Default::default() }
    }

    pub fn for_delta(delta: i8) -> Self {
        Self { delta: Some(delta), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_action_type_serde_is_snake_case() {
        let json = serde_json::to_string(&ActionType::YellowCard).unwrap();
        assert_eq!(json, "\"yellow_card\"");
    }

    #[test]
    fn test_every_action_type_roundtrips() {
        for action in ActionType::iter() {
            let json = serde_json::to_string(&action).unwrap();
            let back: ActionType = serde_json::from_str(&json).unwrap();
            assert_eq!(action, back);
        }
    }

    #[test]
    fn test_only_pitch_movements_flagged() {
        for action in ActionType::iter() {
            let expected =
                matches!(action, ActionType::PitchEntry | ActionType::PitchExit);
            assert_eq!(action.is_pitch_movement(), expected, "{:?}", action);
        }
    }

    #[test]
    fn test_record_omits_empty_detail() {
        let record = ActionRecord {
            id: Uuid::new_v4(),
            entity: Some(EntityRef::Player(7)),
            team: TeamSide::Home,
            action: ActionType::Goal,
            period: Period::First,
            match_minute: 2,
            timestamp_ms: 125_000,
            detail: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("detail"));
        assert!(json.contains("\"type\":\"goal\""));
    }
}
