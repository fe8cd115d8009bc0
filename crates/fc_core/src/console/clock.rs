//! Time accounting for the match clock and per-entity on-pitch time.
//!
//! Both trackers follow the same law: elapsed time is the folded
//! accumulation plus the live segment since the last start stamp. Every
//! operation takes the wall-clock sample as an explicit argument, so reads
//! are pure and the display layer may poll at any cadence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::EntityRef;

/// Production wall-clock source, unix milliseconds.
pub fn wall_clock_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// The running match clock.
///
/// `run_started_at_ms` doubles as the running flag: a stamp is present
/// exactly while the clock runs, so the "running implies stamp" invariant
/// holds by construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MatchClock {
    accumulated_ms: u64,
    run_started_at_ms: Option<u64>,
}

impl MatchClock {
    #[inline]
    pub fn running(&self) -> bool {
        self.run_started_at_ms.is_some()
    }

    /// Start the clock. No-op if already running.
    pub fn start(&mut self, now_ms: u64) {
        if self.run_started_at_ms.is_none() {
            self.run_started_at_ms = Some(now_ms);
        }
    }

    /// Pause the clock, folding the live segment. No-op if not running.
    pub fn pause(&mut self, now_ms: u64) {
        if let Some(started) = self.run_started_at_ms.take() {
            self.accumulated_ms += now_ms.saturating_sub(started);
        }
    }

    /// Zero the clock and stop it. Player accounts are not touched here.
    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.run_started_at_ms = None;
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let live = match self.run_started_at_ms {
            Some(started) => now_ms.saturating_sub(started),
            None => 0,
        };
        self.accumulated_ms + live
    }

    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1_000
    }

    /// Whole minutes on the clock, as stamped onto action records.
    pub fn match_minute(&self, now_ms: u64) -> u8 {
        (self.elapsed_seconds(now_ms) / 60).min(u8::MAX as u64) as u8
    }
}

/// One entity's accumulated on-pitch time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TimeAccount {
    accumulated_ms: u64,
    active_since_ms: Option<u64>,
}

impl TimeAccount {
    #[inline]
    pub fn active(&self) -> bool {
        self.active_since_ms.is_some()
    }

    fn stamp(&mut self, now_ms: u64) {
        if self.active_since_ms.is_none() {
            self.active_since_ms = Some(now_ms);
        }
    }

    fn fold(&mut self, now_ms: u64) {
        if let Some(since) = self.active_since_ms.take() {
            self.accumulated_ms += now_ms.saturating_sub(since);
        }
    }

    pub fn total_ms(&self, now_ms: u64) -> u64 {
        let live = match self.active_since_ms {
            Some(since) => now_ms.saturating_sub(since),
            None => 0,
        };
        self.accumulated_ms + live
    }
}

/// Per-entity time accounts, created lazily on first activation.
///
/// Accounts are never removed mid-session; a full match reset clears the
/// sheet back to its initial empty state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSheet {
    accounts: HashMap<EntityRef, TimeAccount>,
}

impl TimeSheet {
    /// Begin accruing time for an entity. Idempotent: re-activating an
    /// already-active entity never double-counts.
    pub fn activate(&mut self, entity: EntityRef, now_ms: u64) {
        self.accounts.entry(entity).or_default().stamp(now_ms);
    }

    /// Stop accruing and fold the live segment. No-op when inactive.
    pub fn deactivate(&mut self, entity: EntityRef, now_ms: u64) {
        if let Some(account) = self.accounts.get_mut(&entity) {
            account.fold(now_ms);
        }
    }

    /// Fold every active account. Called when the match clock pauses.
    pub fn suspend_all(&mut self, now_ms: u64) {
        for account in self.accounts.values_mut() {
            account.fold(now_ms);
        }
    }

    /// Re-stamp the given entities. Called when the match clock starts,
    /// with the set of currently assigned fielders.
    pub fn resume<I: IntoIterator<Item = EntityRef>>(&mut self, entities: I, now_ms: u64) {
        for entity in entities {
            self.activate(entity, now_ms);
        }
    }

    /// Drop the in-flight segment without folding it. Only used by the
    /// explicit time-reversing undo of a pitch entry.
    pub fn cancel_active(&mut self, entity: EntityRef) {
        if let Some(account) = self.accounts.get_mut(&entity) {
            account.active_since_ms = None;
        }
    }

    /// Resume accrual from a past instant. Only used by the explicit
    /// time-reversing undo of a pitch exit.
    pub fn reactivate_at(&mut self, entity: EntityRef, at_ms: u64) {
        self.accounts.entry(entity).or_default().stamp(at_ms);
    }

    pub fn is_active(&self, entity: EntityRef) -> bool {
        self.accounts.get(&entity).map(TimeAccount::active).unwrap_or(false)
    }

    pub fn total_ms(&self, entity: EntityRef, now_ms: u64) -> u64 {
        self.accounts.get(&entity).map(|a| a.total_ms(now_ms)).unwrap_or(0)
    }

    pub fn minutes_played(&self, entity: EntityRef, now_ms: u64) -> u32 {
        (self.total_ms(entity, now_ms) / 60_000) as u32
    }

    pub fn reset(&mut self) {
        self.accounts.clear();
    }

    /// Stable export for snapshots and reports.
    pub fn entries(&self) -> Vec<(EntityRef, TimeAccount)> {
        let mut entries: Vec<_> = self.accounts.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(entity, _)| format!("{}", entity));
        entries
    }

    pub fn from_entries(entries: Vec<(EntityRef, TimeAccount)>) -> Self {
        Self { accounts: entries.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P7: EntityRef = EntityRef::Player(7);

    #[test]
    fn test_clock_start_pause_accumulates() {
        let mut clock = MatchClock::default();
        clock.start(1_000);
        assert!(clock.running());
        assert_eq!(clock.elapsed_ms(4_000), 3_000);

        clock.pause(4_000);
        assert!(!clock.running());
        assert_eq!(clock.elapsed_ms(9_999), 3_000);

        // Pause then immediate restart loses nothing.
        clock.start(4_000);
        assert_eq!(clock.elapsed_ms(6_000), 5_000);
    }

    #[test]
    fn test_clock_start_is_idempotent() {
        let mut clock = MatchClock::default();
        clock.start(1_000);
        clock.start(2_500); // Ignored; the original stamp stands.
        assert_eq!(clock.elapsed_ms(3_000), 2_000);
    }

    #[test]
    fn test_clock_monotonic_elapsed() {
        let mut clock = MatchClock::default();
        let mut last = 0;
        let mut now = 0;
        for step in 0..40u64 {
            now += 100 + step;
            if step % 7 == 0 {
                clock.start(now);
            } else if step % 5 == 0 {
                clock.pause(now);
            }
            let elapsed = clock.elapsed_ms(now);
            assert!(elapsed >= last, "elapsed went backwards at step {}", step);
            last = elapsed;
        }
    }

    #[test]
    fn test_clock_reset_zeroes() {
        let mut clock = MatchClock::default();
        clock.start(0);
        clock.pause(90_000);
        clock.reset();
        assert_eq!(clock.elapsed_ms(100_000), 0);
        assert!(!clock.running());
    }

    #[test]
    fn test_match_minute_floors() {
        let mut clock = MatchClock::default();
        clock.start(0);
        assert_eq!(clock.match_minute(125_000), 2);
        assert_eq!(clock.match_minute(59_999), 0);
    }

    #[test]
    fn test_timesheet_enter_exit_conservation() {
        let mut sheet = TimeSheet::default();
        // Three enter/exit pairs; the total equals the sum of the deltas
        // regardless of how often total_ms was sampled in between.
        let pairs = [(1_000u64, 4_000u64), (10_000, 10_500), (20_000, 26_000)];
        let mut expected = 0;
        for (enter, exit) in pairs {
            sheet.activate(P7, enter);
            let _ = sheet.total_ms(P7, enter + 100); // Sampling mid-segment.
            sheet.deactivate(P7, exit);
            expected += exit - enter;
            assert_eq!(sheet.total_ms(P7, exit + 999), expected);
        }
    }

    #[test]
    fn test_timesheet_reactivation_is_idempotent() {
        let mut sheet = TimeSheet::default();
        sheet.activate(P7, 1_000);
        sheet.activate(P7, 2_000); // No double counting.
        sheet.deactivate(P7, 3_000);
        assert_eq!(sheet.total_ms(P7, 5_000), 2_000);
    }

    #[test]
    fn test_timesheet_exit_inactive_is_noop() {
        let mut sheet = TimeSheet::default();
        sheet.deactivate(P7, 3_000);
        assert_eq!(sheet.total_ms(P7, 5_000), 0);
    }

    #[test]
    fn test_suspend_and_resume_bracket_accrual() {
        let mut sheet = TimeSheet::default();
        sheet.activate(P7, 0);
        sheet.suspend_all(10_000);
        // Suspended: no accrual while the match clock is paused.
        assert_eq!(sheet.total_ms(P7, 60_000), 10_000);
        sheet.resume([P7], 60_000);
        assert_eq!(sheet.total_ms(P7, 61_000), 11_000);
    }

    #[test]
    fn test_cancel_active_drops_segment() {
        let mut sheet = TimeSheet::default();
        sheet.activate(P7, 0);
        sheet.deactivate(P7, 5_000);
        sheet.activate(P7, 10_000);
        sheet.cancel_active(P7);
        assert_eq!(sheet.total_ms(P7, 20_000), 5_000);
    }

    #[test]
    fn test_reactivate_at_resumes_from_past() {
        let mut sheet = TimeSheet::default();
        sheet.activate(P7, 0);
        sheet.deactivate(P7, 5_000);
        sheet.reactivate_at(P7, 5_000);
        assert_eq!(sheet.total_ms(P7, 8_000), 8_000);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// After N enter/exit pairs the account equals the sum of the
            /// pair spans, however often it was sampled in between.
            #[test]
            fn accumulated_time_is_conserved(
                pairs in proptest::collection::vec((1u64..10_000, 1u64..10_000), 1..20)
            ) {
                let mut sheet = TimeSheet::default();
                let mut now = 0u64;
                let mut expected = 0u64;
                for (gap, span) in pairs {
                    now += gap;
                    sheet.activate(P7, now);
                    let _ = sheet.total_ms(P7, now + span / 2); // Mid-segment sample.
                    now += span;
                    sheet.deactivate(P7, now);
                    expected += span;
                    prop_assert_eq!(sheet.total_ms(P7, now), expected);
                }
            }

            /// Elapsed clock time never decreases across arbitrary
            /// start/pause interleavings.
            #[test]
            fn clock_elapsed_is_monotone(
                steps in proptest::collection::vec((1u64..5_000, any::<bool>()), 1..40)
            ) {
                let mut clock = MatchClock::default();
                let mut now = 0u64;
                let mut last = 0u64;
                for (gap, toggle) in steps {
                    now += gap;
                    if toggle {
                        if clock.running() { clock.pause(now) } else { clock.start(now) }
                    }
                    let elapsed = clock.elapsed_ms(now);
                    prop_assert!(elapsed >= last);
                    last = elapsed;
                }
            }
        }
    }
}
