//! Ordered action log. Append-only except for undo of the newest record.

use serde::{Deserialize, Serialize};

use crate::models::ActionRecord;

/// The single linearization of everything recorded during the match.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct ActionHistory {
    records: Vec<ActionRecord>,
}

impl ActionHistory {
    pub fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    /// Remove and return the most recent record, if any.
    pub fn pop_last(&mut self) -> Option<ActionRecord> {
        self.records.pop()
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
