//! Statistics ledger: per-entity counters, team score, per-half foul
//! counters and timeout usage.
//!
//! The ledger is derived state. It must always equal the left-fold of
//! [`StatSheet::apply`] over the action history in order; `revert` is the
//! exact inverse and must only be called for the most recently appended
//! record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{ActionRecord, ActionType, EntityRef, FoulsByHalf, Period, ScoreLine, TeamSide};

/// Team fouls in one half that put the opponent in the bonus.
pub const FOUL_BONUS_LIMIT: u8 = 5;

/// Counters for one entity. All reverts saturate at zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StatEntry {
    pub goals: u16,
    pub assists: u16,
    pub fouls: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub saves: u16,
}

/// Per-half team foul counters.
///
/// The raw tally keeps counting past the bonus limit so that apply/revert
/// stay exact inverses; [`FoulCounters::count`] exposes the capped value
/// the scoreboard shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FoulCounters {
    home_first: u8,
    home_second: u8,
    away_first: u8,
    away_second: u8,
}

impl FoulCounters {
    fn slot_mut(&mut self, team: TeamSide, period: Period) -> &mut u8 {
        match (team, period) {
            (TeamSide::Home, Period::First) => &mut self.home_first,
            (TeamSide::Home, Period::Second) => &mut self.home_second,
            (TeamSide::Away, Period::First) => &mut self.away_first,
            (TeamSide::Away, Period::Second) => &mut self.away_second,
        }
    }

    fn slot(&self, team: TeamSide, period: Period) -> u8 {
        match (team, period) {
            (TeamSide::Home, Period::First) => self.home_first,
            (TeamSide::Home, Period::Second) => self.home_second,
            (TeamSide::Away, Period::First) => self.away_first,
            (TeamSide::Away, Period::Second) => self.away_second,
        }
    }

    /// Record a foul. Returns `true` exactly when the counter crosses into
    /// the bonus (4 -> 5); later fouls keep the displayed count at the cap
    /// and never re-fire.
    pub fn record(&mut self, team: TeamSide, period: Period) -> bool {
        let slot = self.slot_mut(team, period);
        *slot = slot.saturating_add(1);
        *slot == FOUL_BONUS_LIMIT
    }

    /// Exact inverse of [`FoulCounters::record`], floor-clamped.
    pub fn revert(&mut self, team: TeamSide, period: Period) {
        let slot = self.slot_mut(team, period);
        *slot = slot.saturating_sub(1);
    }

    /// Displayed count, capped at the bonus limit.
    pub fn count(&self, team: TeamSide, period: Period) -> u8 {
        self.slot(team, period).min(FOUL_BONUS_LIMIT)
    }

    pub fn in_bonus(&self, team: TeamSide, period: Period) -> bool {
        self.slot(team, period) >= FOUL_BONUS_LIMIT
    }

    /// Zero the counters of one half. Half-time does this defensively for
    /// the upcoming half.
    pub fn reset_period(&mut self, period: Period) {
        match period {
            Period::First => {
                self.home_first = 0;
                self.away_first = 0;
            }
            Period::Second => {
                self.home_second = 0;
                self.away_second = 0;
            }
        }
    }

    pub fn by_half(&self) -> FoulsByHalf {
        FoulsByHalf {
            home_first: self.count(TeamSide::Home, Period::First),
            home_second: self.count(TeamSide::Home, Period::Second),
            away_first: self.count(TeamSide::Away, Period::First),
            away_second: self.count(TeamSide::Away, Period::Second),
        }
    }
}

/// One timeout per team per half.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TimeoutUsage {
    home_first: bool,
    home_second: bool,
    away_first: bool,
    away_second: bool,
}

impl TimeoutUsage {
    fn slot_mut(&mut self, team: TeamSide, period: Period) -> &mut bool {
        match (team, period) {
            (TeamSide::Home, Period::First) => &mut self.home_first,
            (TeamSide::Home, Period::Second) => &mut self.home_second,
            (TeamSide::Away, Period::First) => &mut self.away_first,
            (TeamSide::Away, Period::Second) => &mut self.away_second,
        }
    }

    pub fn is_used(&self, team: TeamSide, period: Period) -> bool {
        match (team, period) {
            (TeamSide::Home, Period::First) => self.home_first,
            (TeamSide::Home, Period::Second) => self.home_second,
            (TeamSide::Away, Period::First) => self.away_first,
            (TeamSide::Away, Period::Second) => self.away_second,
        }
    }

    pub fn mark_used(&mut self, team: TeamSide, period: Period) {
        *self.slot_mut(team, period) = true;
    }

    pub fn clear(&mut self, team: TeamSide, period: Period) {
        *self.slot_mut(team, period) = false;
    }
}

/// Effects of applying one record that the session turns into signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The record pushed its team's half counter into the bonus.
    pub foul_bonus: bool,
}

/// The aggregated statistics state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatSheet {
    entries: HashMap<EntityRef, StatEntry>,
    pub score: ScoreLine,
    pub fouls: FoulCounters,
    pub timeouts: TimeoutUsage,
}

impl StatSheet {
    pub fn entry(&self, entity: EntityRef) -> StatEntry {
        self.entries.get(&entity).copied().unwrap_or_default()
    }

    fn entry_mut(&mut self, entity: EntityRef) -> &mut StatEntry {
        self.entries.entry(entity).or_default()
    }

    /// Fold one record into the sheet.
    pub fn apply(&mut self, record: &ActionRecord) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        match record.action {
            ActionType::Goal => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).goals += 1;
                }
                self.bump_score(record.team, 1);
            }
            ActionType::Assist => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).assists += 1;
                }
            }
            ActionType::Foul => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).fouls += 1;
                }
                outcome.foul_bonus = self.fouls.record(record.team, record.period);
            }
            ActionType::YellowCard => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).yellow_cards += 1;
                }
            }
            ActionType::RedCard => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).red_cards += 1;
                }
            }
            ActionType::Save => {
                if let Some(entity) = record.entity {
                    self.entry_mut(entity).saves += 1;
                }
            }
            ActionType::Timeout => {
                self.timeouts.mark_used(record.team, record.period);
            }
            ActionType::ScoreCorrection => {
                let delta = record.detail.as_ref().and_then(|d| d.delta).unwrap_or(0);
                self.bump_score(record.team, delta);
            }
            // Pitch movements feed time accounting, not counters.
            ActionType::PitchEntry | ActionType::PitchExit => {}
        }

        outcome
    }

    /// Exact inverse of [`StatSheet::apply`], floor-clamped at zero.
    pub fn revert(&mut self, record: &ActionRecord) {
        match record.action {
            ActionType::Goal => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.goals = entry.goals.saturating_sub(1);
                }
                self.bump_score(record.team, -1);
            }
            ActionType::Assist => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.assists = entry.assists.saturating_sub(1);
                }
            }
            ActionType::Foul => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.fouls = entry.fouls.saturating_sub(1);
                }
                // Unclamping from the bonus back to 4 is fine; the bonus
                // signal is not re-armed here.
                self.fouls.revert(record.team, record.period);
            }
            ActionType::YellowCard => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.yellow_cards = entry.yellow_cards.saturating_sub(1);
                }
            }
            ActionType::RedCard => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.red_cards = entry.red_cards.saturating_sub(1);
                }
            }
            ActionType::Save => {
                if let Some(entity) = record.entity {
                    let entry = self.entry_mut(entity);
                    entry.saves = entry.saves.saturating_sub(1);
                }
            }
            ActionType::Timeout => {
                self.timeouts.clear(record.team, record.period);
            }
            ActionType::ScoreCorrection => {
                let delta = record.detail.as_ref().and_then(|d| d.delta).unwrap_or(0);
                self.bump_score(record.team, -delta);
            }
            ActionType::PitchEntry | ActionType::PitchExit => {}
        }
    }

    fn bump_score(&mut self, team: TeamSide, delta: i8) {
        let slot = match team {
            TeamSide::Home => &mut self.score.home,
            TeamSide::Away => &mut self.score.away,
        };
        *slot = slot.saturating_add_signed(delta);
    }

    /// Rebuild from scratch by folding a history prefix.
    pub fn replay<'a, I: IntoIterator<Item = &'a ActionRecord>>(records: I) -> Self {
        let mut sheet = Self::default();
        for record in records {
            sheet.apply(record);
        }
        sheet
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stable export for the persisted counters slice.
    pub fn entry_list(&self) -> Vec<(EntityRef, StatEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(entity, _)| format!("{}", entity));
        entries
    }

    pub fn from_parts(
        entries: Vec<(EntityRef, StatEntry)>,
        score: ScoreLine,
        fouls: FoulCounters,
        timeouts: TimeoutUsage,
    ) -> Self {
        Self { entries: entries.into_iter().collect(), score, fouls, timeouts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionDetail, Period};
    use uuid::Uuid;

    fn record(entity: Option<EntityRef>, team: TeamSide, action: ActionType) -> ActionRecord {
        ActionRecord {
            id: Uuid::new_v4(),
            entity,
            team,
            action,
            period: Period::First,
            match_minute: 0,
            timestamp_ms: 0,
            detail: None,
        }
    }

    #[test]
    fn test_goal_bumps_entry_and_score() {
        let mut sheet = StatSheet::default();
        let goal = record(Some(EntityRef::Player(7)), TeamSide::Home, ActionType::Goal);

        sheet.apply(&goal);
        assert_eq!(sheet.entry(EntityRef::Player(7)).goals, 1);
        assert_eq!(sheet.score, ScoreLine { home: 1, away: 0 });

        sheet.revert(&goal);
        assert_eq!(sheet.entry(EntityRef::Player(7)).goals, 0);
        assert_eq!(sheet.score, ScoreLine::default());
    }

    #[test]
    fn test_foul_bonus_fires_exactly_on_fifth() {
        let mut sheet = StatSheet::default();
        let foul = record(Some(EntityRef::Player(4)), TeamSide::Home, ActionType::Foul);

        for expected_count in 1..=4u8 {
            let outcome = sheet.apply(&foul);
            assert!(!outcome.foul_bonus);
            assert_eq!(sheet.fouls.count(TeamSide::Home, Period::First), expected_count);
        }

        let fifth = sheet.apply(&foul);
        assert!(fifth.foul_bonus);
        assert_eq!(sheet.fouls.count(TeamSide::Home, Period::First), 5);

        // A sixth foul still counts for the player, leaves the team counter
        // displayed at the cap and never re-fires the bonus.
        let sixth = sheet.apply(&foul);
        assert!(!sixth.foul_bonus);
        assert_eq!(sheet.fouls.count(TeamSide::Home, Period::First), 5);
        assert_eq!(sheet.entry(EntityRef::Player(4)).fouls, 6);
    }

    #[test]
    fn test_foul_revert_is_exact_inverse_past_the_cap() {
        let mut sheet = StatSheet::default();
        let foul = record(Some(EntityRef::Player(4)), TeamSide::Away, ActionType::Foul);

        for _ in 0..6 {
            sheet.apply(&foul);
        }
        // Undo the sixth: the displayed count stays at the cap because five
        // countable fouls remain.
        sheet.revert(&foul);
        assert_eq!(sheet.fouls.count(TeamSide::Away, Period::First), 5);
        sheet.revert(&foul);
        assert_eq!(sheet.fouls.count(TeamSide::Away, Period::First), 4);
    }

    #[test]
    fn test_revert_clamps_at_zero() {
        let mut sheet = StatSheet::default();
        let card = record(Some(EntityRef::Player(2)), TeamSide::Home, ActionType::YellowCard);
        sheet.revert(&card);
        assert_eq!(sheet.entry(EntityRef::Player(2)).yellow_cards, 0);
    }

    #[test]
    fn test_timeout_apply_and_revert() {
        let mut sheet = StatSheet::default();
        let timeout = record(None, TeamSide::Away, ActionType::Timeout);

        assert!(!sheet.timeouts.is_used(TeamSide::Away, Period::First));
        sheet.apply(&timeout);
        assert!(sheet.timeouts.is_used(TeamSide::Away, Period::First));
        sheet.revert(&timeout);
        assert!(!sheet.timeouts.is_used(TeamSide::Away, Period::First));
    }

    #[test]
    fn test_score_correction_round_trips() {
        let mut sheet = StatSheet::default();
        let mut up = record(None, TeamSide::Home, ActionType::ScoreCorrection);
        up.detail = Some(ActionDetail::for_delta(1));

        sheet.apply(&up);
        assert_eq!(sheet.score.home, 1);
        sheet.revert(&up);
        assert_eq!(sheet.score.home, 0);
    }

    #[test]
    fn test_replay_equals_incremental_fold() {
        let records = vec![
            record(Some(EntityRef::Player(7)), TeamSide::Home, ActionType::Goal),
            record(Some(EntityRef::Player(4)), TeamSide::Home, ActionType::Foul),
            record(Some(EntityRef::Visitor(9)), TeamSide::Away, ActionType::YellowCard),
            record(None, TeamSide::Home, ActionType::Timeout),
        ];

        let mut incremental = StatSheet::default();
        for r in &records {
            incremental.apply(r);
        }
        assert_eq!(incremental, StatSheet::replay(records.iter()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The displayed foul counter never exceeds the cap, no matter
            /// how fouls and undo interleave.
            #[test]
            fn foul_counter_never_exceeds_cap(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
                let mut sheet = StatSheet::default();
                let foul = record(Some(EntityRef::Player(1)), TeamSide::Home, ActionType::Foul);
                let mut applied = 0u32;
                for is_apply in ops {
                    if is_apply {
                        sheet.apply(&foul);
                        applied += 1;
                    } else if applied > 0 {
                        sheet.revert(&foul);
                        applied -= 1;
                    }
                    prop_assert!(sheet.fouls.count(TeamSide::Home, Period::First) <= FOUL_BONUS_LIMIT);
                }
            }
        }
    }
}
