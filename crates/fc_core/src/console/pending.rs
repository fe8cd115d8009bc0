//! Pending-operation envelope and the lineup watchdog.
//!
//! Both are pure functions of (state, wall-clock sample): the console has
//! no timers of its own, it only reacts when `tick` hands it the current
//! time. They gate the *invocation* of core operations, never their
//! execution.

use crate::models::TeamSide;

/// How long a proposed risky operation stays confirmable.
pub const CONFIRM_TTL_MS: u64 = 5_000;

/// Debounce before the missing-players warning surfaces.
pub const LINEUP_WARNING_DEBOUNCE_MS: u64 = 10_000;

/// Operations risky enough to require a two-step confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedOp {
    /// Start or pause the match clock.
    ClockToggle,
    /// Manual score correction.
    ScoreAdjust { team: TeamSide, delta: i8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub op: GuardedOp,
    pub proposed_at_ms: u64,
    pub deadline_ms: u64,
}

/// Result of a confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Deadline met; the caller must now execute the operation.
    Confirmed(GuardedOp),
    /// Deadline missed; the proposal auto-cancelled instead.
    Expired(GuardedOp),
    /// Nothing was pending.
    Nothing,
}

/// Propose / confirm-before-deadline / auto-cancel envelope.
///
/// At most one operation is pending at a time; a new proposal replaces the
/// previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingGate {
    current: Option<PendingConfirmation>,
}

impl PendingGate {
    pub fn propose(&mut self, op: GuardedOp, now_ms: u64) -> PendingConfirmation {
        let pending = PendingConfirmation {
            op,
            proposed_at_ms: now_ms,
            deadline_ms: now_ms + CONFIRM_TTL_MS,
        };
        self.current = Some(pending);
        pending
    }

    pub fn confirm(&mut self, now_ms: u64) -> ConfirmOutcome {
        match self.current.take() {
            Some(pending) if now_ms <= pending.deadline_ms => {
                ConfirmOutcome::Confirmed(pending.op)
            }
            Some(pending) => ConfirmOutcome::Expired(pending.op),
            None => ConfirmOutcome::Nothing,
        }
    }

    pub fn cancel(&mut self) -> Option<GuardedOp> {
        self.current.take().map(|p| p.op)
    }

    /// Drop an expired proposal, returning it so a signal can be raised.
    pub fn sweep(&mut self, now_ms: u64) -> Option<GuardedOp> {
        match self.current {
            Some(pending) if now_ms > pending.deadline_ms => {
                self.current = None;
                Some(pending.op)
            }
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<PendingConfirmation> {
        self.current
    }
}

/// Debounced monitor for the advisory 5-player rule.
///
/// During live play a short lineup does not block actions; it raises a
/// warning once per violation episode, after the debounce window, and
/// re-arms when the lineup is remedied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterWatchdog {
    short_since_ms: Option<u64>,
    warned: bool,
}

impl RosterWatchdog {
    /// Feed one observation. Returns `true` when the warning should fire.
    pub fn observe(&mut self, lineup_complete: bool, now_ms: u64) -> bool {
        if lineup_complete {
            self.short_since_ms = None;
            self.warned = false;
            return false;
        }

        let since = *self.short_since_ms.get_or_insert(now_ms);
        if !self.warned && now_ms.saturating_sub(since) >= LINEUP_WARNING_DEBOUNCE_MS {
            self.warned = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_before_deadline() {
        let mut gate = PendingGate::default();
        gate.propose(GuardedOp::ClockToggle, 1_000);
        assert_eq!(
            gate.confirm(1_000 + CONFIRM_TTL_MS),
            ConfirmOutcome::Confirmed(GuardedOp::ClockToggle)
        );
        assert_eq!(gate.confirm(7_000), ConfirmOutcome::Nothing);
    }

    #[test]
    fn test_confirm_after_deadline_auto_cancels() {
        let mut gate = PendingGate::default();
        gate.propose(GuardedOp::ClockToggle, 1_000);
        assert_eq!(
            gate.confirm(1_001 + CONFIRM_TTL_MS),
            ConfirmOutcome::Expired(GuardedOp::ClockToggle)
        );
        assert_eq!(gate.pending(), None);
    }

    #[test]
    fn test_new_proposal_replaces_previous() {
        let mut gate = PendingGate::default();
        gate.propose(GuardedOp::ClockToggle, 0);
        gate.propose(GuardedOp::ScoreAdjust { team: TeamSide::Home, delta: 1 }, 100);
        match gate.confirm(200) {
            ConfirmOutcome::Confirmed(GuardedOp::ScoreAdjust { delta: 1, .. }) => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_sweep_only_after_deadline() {
        let mut gate = PendingGate::default();
        gate.propose(GuardedOp::ClockToggle, 0);
        assert_eq!(gate.sweep(CONFIRM_TTL_MS), None);
        assert_eq!(gate.sweep(CONFIRM_TTL_MS + 1), Some(GuardedOp::ClockToggle));
        assert_eq!(gate.sweep(CONFIRM_TTL_MS + 2), None);
    }

    #[test]
    fn test_watchdog_fires_once_per_episode() {
        let mut dog = RosterWatchdog::default();
        assert!(!dog.observe(false, 0));
        assert!(!dog.observe(false, 9_999));
        assert!(dog.observe(false, 10_000));
        // Still short: no repeat.
        assert!(!dog.observe(false, 30_000));
        // Remedied, then short again: re-arms.
        assert!(!dog.observe(true, 31_000));
        assert!(!dog.observe(false, 32_000));
        assert!(dog.observe(false, 42_000));
    }
}
