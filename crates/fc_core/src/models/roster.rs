use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::{EntityRef, StaffRole};

/// The five futsal pitch positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum PitchSlot {
    Goalkeeper,
    Cierre,
    LeftWing,
    RightWing,
    Pivot,
}

impl PitchSlot {
    pub const ALL: [PitchSlot; 5] = [
        PitchSlot::Goalkeeper,
        PitchSlot::Cierre,
        PitchSlot::LeftWing,
        PitchSlot::RightWing,
        PitchSlot::Pivot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PitchSlot::Goalkeeper => "Goalkeeper",
            PitchSlot::Cierre => "Cierre",
            PitchSlot::LeftWing => "Left wing",
            PitchSlot::RightWing => "Right wing",
            PitchSlot::Pivot => "Pivot",
        }
    }
}

/// Roster entry for a club player with confirmed attendance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterPlayer {
    pub id: u32,
    pub display_name: String,
    pub number: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterStaff {
    pub role: StaffRole,
    pub display_name: String,
}

/// Attendance-confirmed roster as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfirmedRoster {
    pub players: Vec<RosterPlayer>,
    #[serde(default)]
    pub staff: Vec<RosterStaff>,
}

impl ConfirmedRoster {
    /// Whether the entity is known to this session.
    ///
    /// Visitors are always accepted: the away squad is keyed in by shirt
    /// number at the venue and has no backend-confirmed roster.
    pub fn knows(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Player(id) => self.players.iter().any(|p| p.id == id),
            EntityRef::Staff(role) => self.staff.iter().any(|s| s.role == role),
            EntityRef::Visitor(_) => true,
        }
    }

    pub fn player(&self, id: u32) -> Option<&RosterPlayer> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Hand-maintained bookkeeping for the visiting side.
///
/// The operator toggles which shirt numbers are in use and may attach a
/// display name to a number when the referee sheet provides one. Both maps
/// persist as their own snapshot slices.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VisitingSquad {
    active_numbers: BTreeSet<u8>,
    name_overrides: BTreeMap<u8, String>,
}

impl VisitingSquad {
    pub fn activate(&mut self, number: u8) {
        self.active_numbers.insert(number);
    }

    pub fn deactivate(&mut self, number: u8) {
        self.active_numbers.remove(&number);
    }

    pub fn is_active(&self, number: u8) -> bool {
        self.active_numbers.contains(&number)
    }

    pub fn active_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.active_numbers.iter().copied()
    }

    /// Attach or clear a display name for a shirt number.
    pub fn set_name_override(&mut self, number: u8, name: Option<String>) {
        match name {
            Some(name) if !name.trim().is_empty() => {
                self.name_overrides.insert(number, name);
            }
            _ => {
                self.name_overrides.remove(&number);
            }
        }
    }

    /// Display label for a visiting shirt number.
    pub fn display_name(&self, number: u8) -> String {
        match self.name_overrides.get(&number) {
            Some(name) => name.clone(),
            None => format!("#{}", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_slot_all_covers_every_variant() {
        let from_iter: Vec<PitchSlot> = PitchSlot::iter().collect();
        assert_eq!(from_iter, PitchSlot::ALL.to_vec());
    }

    #[test]
    fn test_roster_membership() {
        let roster = ConfirmedRoster {
            players: vec![RosterPlayer {
                id: 3,
                display_name: "Ana".to_string(),
                number: 10,
                position: Some("pivot".to_string()),
            }],
            staff: vec![RosterStaff {
                role: StaffRole::HeadCoach,
                display_name: "Marta".to_string(),
            }],
        };

        assert!(roster.knows(EntityRef::Player(3)));
        assert!(!roster.knows(EntityRef::Player(4)));
        assert!(roster.knows(EntityRef::Staff(StaffRole::HeadCoach)));
        assert!(!roster.knows(EntityRef::Staff(StaffRole::Physio)));
        // Visitors have no confirmed roster and are always accepted.
        assert!(roster.knows(EntityRef::Visitor(99)));
    }

    #[test]
    fn test_visiting_name_override() {
        let mut squad = VisitingSquad::default();
        squad.activate(7);
        assert_eq!(squad.display_name(7), "#7");

        squad.set_name_override(7, Some("Lucia".to_string()));
        assert_eq!(squad.display_name(7), "Lucia");

        // Blank names clear the override.
        squad.set_name_override(7, Some("  ".to_string()));
        assert_eq!(squad.display_name(7), "#7");
    }
}
