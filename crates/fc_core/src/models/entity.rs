use std::fmt;

use serde::{Deserialize, Serialize};

/// Team side within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    #[inline]
    pub const fn is_home(self) -> bool {
        matches!(self, TeamSide::Home)
    }
}

/// Match half. Scopes foul counters and timeout usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    First,
    Second,
}

impl Period {
    /// 1-based half number as sent in reports.
    #[inline]
    pub const fn number(self) -> u8 {
        match self {
            Period::First => 1,
            Period::Second => 2,
        }
    }
}

/// Bench staff roles eligible for cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    HeadCoach,
    AssistantCoach,
    Delegate,
    Physio,
}

impl StaffRole {
    pub const ALL: [StaffRole; 4] = [
        StaffRole::HeadCoach,
        StaffRole::AssistantCoach,
        StaffRole::Delegate,
        StaffRole::Physio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StaffRole::HeadCoach => "Head coach",
            StaffRole::AssistantCoach => "Assistant coach",
            StaffRole::Delegate => "Delegate",
            StaffRole::Physio => "Physio",
        }
    }
}

/// Reference to any entity actions can be recorded against.
///
/// Replaces the stringly-typed ids of the legacy console (`"staff-E"`,
/// `"visitante-7"`, bare numeric ids) with one exhaustive dispatch point.
/// Visiting players are tracked by shirt number because the away squad is
/// keyed in by hand at the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    Player(u32),
    Staff(StaffRole),
    Visitor(u8),
}

impl EntityRef {
    /// Entities whose on-pitch time is tracked. Staff never enter the pitch.
    #[inline]
    pub const fn is_fielder(self) -> bool {
        matches!(self, EntityRef::Player(_) | EntityRef::Visitor(_))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Player(id) => write!(f, "player#{}", id),
            EntityRef::Staff(role) => write!(f, "staff:{}", role.label()),
            EntityRef::Visitor(number) => write!(f, "visitor#{}", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involutive() {
        assert_eq!(TeamSide::Home.opponent(), TeamSide::Away);
        assert_eq!(TeamSide::Away.opponent().opponent(), TeamSide::Away);
    }

    #[test]
    fn test_entity_ref_serde_roundtrip() {
        for entity in [
            EntityRef::Player(7),
            EntityRef::Staff(StaffRole::Delegate),
            EntityRef::Visitor(12),
        ] {
            let json = serde_json::to_string(&entity).unwrap();
            let back: EntityRef = serde_json::from_str(&json).unwrap();
            assert_eq!(entity, back);
        }
    }

    #[test]
    fn test_staff_are_not_fielders() {
        assert!(EntityRef::Player(1).is_fielder());
        assert!(EntityRef::Visitor(9).is_fielder());
        assert!(!EntityRef::Staff(StaffRole::HeadCoach).is_fielder());
    }
}
