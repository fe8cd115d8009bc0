//! Five-slot assignment board and the input-mode latch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ActionType, EntityRef, PitchSlot};

/// What an [`AssignmentBoard::assign`] call displaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentChange {
    /// Occupant vacated from the target slot, if it held someone else.
    pub displaced: Option<EntityRef>,
    /// Slot the entity previously held, if it moved within the pitch.
    /// Equal to the target slot when the call was a no-op.
    pub previous_slot: Option<PitchSlot>,
}

/// Mapping of the five pitch positions to entities.
///
/// Structural invariant: an entity occupies at most one slot at any time.
/// `assign` vacates the previous slot in the same call, so the invariant
/// cannot be observed broken.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AssignmentBoard {
    slots: BTreeMap<PitchSlot, EntityRef>,
}

impl AssignmentBoard {
    pub fn occupant(&self, slot: PitchSlot) -> Option<EntityRef> {
        self.slots.get(&slot).copied()
    }

    pub fn slot_of(&self, entity: EntityRef) -> Option<PitchSlot> {
        self.slots
            .iter()
            .find(|(_, occupant)| **occupant == entity)
            .map(|(slot, _)| *slot)
    }

    pub fn assigned_count(&self) -> u8 {
        self.slots.len() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.slots.len() == PitchSlot::ALL.len()
    }

    /// Entities currently on the pitch.
    pub fn fielders(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.slots.values().copied()
    }

    /// Put an entity on a slot, atomically vacating both the slot's
    /// previous occupant and the entity's previous slot.
    pub fn assign(&mut self, entity: EntityRef, slot: PitchSlot) -> AssignmentChange {
        if self.occupant(slot) == Some(entity) {
            return AssignmentChange { displaced: None, previous_slot: Some(slot) };
        }

        let previous_slot = self.slot_of(entity);
        if let Some(previous) = previous_slot {
            self.slots.remove(&previous);
        }
        let displaced = self.slots.insert(slot, entity);

        AssignmentChange { displaced, previous_slot }
    }

    /// Vacate a slot, returning its occupant.
    pub fn clear(&mut self, slot: PitchSlot) -> Option<EntityRef> {
        self.slots.remove(&slot)
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
    }
}

/// Exclusive input latch of the console UI.
///
/// A pending action (card/goal waiting for its target) and a pending slot
/// selection are mutually exclusive; arming one clears the other. Both
/// drag-and-drop and click-to-assign funnel through the same board calls,
/// so the resulting state cannot depend on the input modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Idle,
    ArmedAction(ActionType),
    ArmedSlot(PitchSlot),
}

impl InputMode {
    pub fn armed_action(self) -> Option<ActionType> {
        match self {
            InputMode::ArmedAction(action) => Some(action),
            _ => None,
        }
    }

    pub fn armed_slot(self) -> Option<PitchSlot> {
        match self {
            InputMode::ArmedSlot(slot) => Some(slot),
            _ => None,
        }
    }
}
