//! The match console session: one object owning every live component.
//!
//! All state mutations are synchronous; the touched snapshot slices are
//! mirrored to the store before the mutating call returns, so a page
//! reload (or crash) can resume the match. The in-memory state is always
//! authoritative — the store is read exactly once, at session open.

use thiserror::Error;
use uuid::Uuid;

use crate::backend::{BackendError, MatchBackend};
use crate::error::{ConsoleError, Result};
use crate::models::{
    ActionDetail, ActionRecord, ActionType, ConfirmedRoster, EntityRef, MatchReport, Period,
    PitchSlot, PlayerReportLine, ScoreLine, StaffReportLine, TeamSide, VisitingSquad,
};
use crate::save::{
    encode_slice, read_slice, CountersSlice, HistorySlice, PhaseSlice, SnapshotKey,
    SnapshotStore, TimeAccountsSlice,
};

use super::assignments::{AssignmentBoard, InputMode};
use super::clock::{MatchClock, TimeSheet};
use super::history::ActionHistory;
use super::ledger::{StatSheet, TimeoutUsage};
use super::pending::{ConfirmOutcome, GuardedOp, PendingConfirmation, PendingGate, RosterWatchdog};
use super::phase::MatchPhase;
use super::signals::{ConsoleSignal, SignalQueue};

/// Failures of the finalize submission.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct MatchSession {
    match_id: String,
    roster: ConfirmedRoster,
    visiting: VisitingSquad,
    phase: MatchPhase,
    period: Period,
    board: AssignmentBoard,
    input_mode: InputMode,
    clock: MatchClock,
    time_sheet: TimeSheet,
    ledger: StatSheet,
    history: ActionHistory,
    gate: PendingGate,
    watchdog: RosterWatchdog,
    signals: SignalQueue,
    store: Box<dyn SnapshotStore>,
}

impl MatchSession {
    // ========================
    // Session open paths
    // ========================

    /// Fresh console for a match with no usable local data.
    pub fn open_fresh(
        match_id: impl Into<String>,
        roster: ConfirmedRoster,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        let match_id = match_id.into();
        log::info!("opening fresh console session for {}", match_id);
        Self {
            match_id,
            roster,
            visiting: VisitingSquad::default(),
            phase: MatchPhase::Setup,
            period: Period::First,
            board: AssignmentBoard::default(),
            input_mode: InputMode::Idle,
            clock: MatchClock::default(),
            time_sheet: TimeSheet::default(),
            ledger: StatSheet::default(),
            history: ActionHistory::default(),
            gate: PendingGate::default(),
            watchdog: RosterWatchdog::default(),
            signals: SignalQueue::default(),
            store,
        }
    }

    /// Discard stale local data and open fresh (the reset path of the
    /// session-open decision).
    pub fn open_reset(
        match_id: impl Into<String>,
        roster: ConfirmedRoster,
        mut store: Box<dyn SnapshotStore>,
    ) -> Self {
        let match_id = match_id.into();
        if let Err(err) = store.clear_match(&match_id) {
            log::warn!("could not clear stale slices for {}: {}", match_id, err);
        }
        Self::open_fresh(match_id, roster, store)
    }

    /// Hydrate from the persisted slices, salvaging around any that cannot
    /// be restored. Each broken slice degrades to its default and raises a
    /// [`ConsoleSignal::SliceSalvaged`] so the operator learns what was
    /// lost.
    pub fn open_resumed(
        match_id: impl Into<String>,
        roster: ConfirmedRoster,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        let match_id = match_id.into();
        log::info!("resuming console session for {}", match_id);
        let mut session = Self::open_fresh(match_id, roster, store);

        let phase_slice: PhaseSlice = session.salvage(SnapshotKey::Phase).unwrap_or_default();
        session.phase = phase_slice.phase;
        session.period = phase_slice.period;

        session.board = session.salvage(SnapshotKey::Assignments).unwrap_or_default();
        session.visiting = session.salvage(SnapshotKey::Visiting).unwrap_or_default();
        session.clock = session.salvage(SnapshotKey::Clock).unwrap_or_default();

        let accounts: TimeAccountsSlice =
            session.salvage(SnapshotKey::TimeAccounts).unwrap_or_default();
        session.time_sheet = TimeSheet::from_entries(accounts.entries);

        // History is the authoritative ledger source: replay it when it is
        // restorable, and only fall back to the mirrored counters when it
        // is not.
        match session.salvage::<HistorySlice>(SnapshotKey::History) {
            Some(slice) => {
                session.ledger = StatSheet::replay(slice.records.iter());
                session.history = ActionHistory::default();
                for record in slice.records {
                    session.history.push(record);
                }
            }
            None => {
                let counters: CountersSlice =
                    session.salvage(SnapshotKey::Counters).unwrap_or_default();
                let timeouts: TimeoutUsage =
                    session.salvage(SnapshotKey::Timeouts).unwrap_or_default();
                session.ledger = StatSheet::from_parts(
                    counters.entries,
                    counters.score,
                    counters.fouls,
                    timeouts,
                );
            }
        }

        session
    }

    fn salvage<T: serde::de::DeserializeOwned>(&mut self, key: SnapshotKey) -> Option<T> {
        match read_slice(&*self.store, &self.match_id, key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!(
                    "slice {:?} for {} could not be restored: {}",
                    key,
                    self.match_id,
                    err
                );
                self.signals.push(ConsoleSignal::SliceSalvaged { key });
                None
            }
        }
    }

    // ========================
    // Phase transitions
    // ========================

    /// Kick off. Requires the full five-player lineup; the clock stays
    /// stopped until the operator starts it.
    pub fn start_first_half(&mut self, _now_ms: u64) -> Result<()> {
        self.guard_transition(&MatchPhase::FirstHalf)?;
        if !self.board.is_complete() {
            return Err(ConsoleError::LineupIncomplete {
                expected: PitchSlot::ALL.len() as u8,
                found: self.board.assigned_count(),
            });
        }

        self.phase = MatchPhase::FirstHalf;
        self.period = Period::First;
        log::info!("{}: first half under way", self.match_id);
        self.persist(&[SnapshotKey::Phase]);
        Ok(())
    }

    /// Close the first half: clock pauses, on-pitch accrual suspends, and
    /// the upcoming half's foul counters are zeroed defensively.
    pub fn begin_half_time(&mut self, now_ms: u64) -> Result<()> {
        self.guard_transition(&MatchPhase::HalfTime)?;

        self.clock.pause(now_ms);
        self.time_sheet.suspend_all(now_ms);
        self.ledger.fouls.reset_period(Period::Second);
        self.phase = MatchPhase::HalfTime;
        log::info!("{}: half time", self.match_id);
        self.persist(&[
            SnapshotKey::Phase,
            SnapshotKey::Clock,
            SnapshotKey::TimeAccounts,
            SnapshotKey::Counters,
        ]);
        Ok(())
    }

    /// Restart for the second half: the clock resets to zero and starts
    /// running immediately.
    pub fn begin_second_half(&mut self, now_ms: u64) -> Result<()> {
        self.guard_transition(&MatchPhase::SecondHalf)?;

        self.phase = MatchPhase::SecondHalf;
        self.period = Period::Second;
        self.clock.reset();
        self.clock.start(now_ms);
        let fielders: Vec<EntityRef> = self.on_pitch_entities();
        self.time_sheet.resume(fielders, now_ms);
        log::info!("{}: second half under way", self.match_id);
        self.persist(&[SnapshotKey::Phase, SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        Ok(())
    }

    /// Final whistle. Refuses an empty match unless `force` confirms the
    /// operator really wants a report with no recorded actions.
    pub fn finish_match(&mut self, now_ms: u64, force: bool) -> Result<()> {
        self.guard_transition(&MatchPhase::Finished)?;
        if self.history.is_empty() && !force {
            return Err(ConsoleError::NothingRecorded);
        }

        self.clock.pause(now_ms);
        self.time_sheet.suspend_all(now_ms);
        self.phase = MatchPhase::Finished;
        log::info!("{}: full time", self.match_id);
        self.persist(&[SnapshotKey::Phase, SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        Ok(())
    }

    /// Cut the match short. The reason is mandatory and lands in the
    /// persisted phase slice.
    pub fn abort(&mut self, now_ms: u64, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ConsoleError::MissingAbortReason);
        }
        let target = MatchPhase::Aborted { reason: reason.to_string() };
        self.guard_transition(&target)?;

        self.clock.pause(now_ms);
        self.time_sheet.suspend_all(now_ms);
        self.phase = target;
        log::warn!("{}: match aborted ({})", self.match_id, reason);
        self.persist(&[SnapshotKey::Phase, SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        Ok(())
    }

    /// Full reset back to `Setup`: every component returns to its initial
    /// value and the match's persisted slices are dropped.
    pub fn reset_match(&mut self) {
        log::info!("{}: full console reset", self.match_id);
        self.phase = MatchPhase::Setup;
        self.period = Period::First;
        self.board.clear_all();
        self.visiting = VisitingSquad::default();
        self.input_mode = InputMode::Idle;
        self.clock.reset();
        self.time_sheet.reset();
        self.ledger.reset();
        self.history.clear();
        self.gate = PendingGate::default();
        self.watchdog.reset();
        self.signals = SignalQueue::default();
        if let Err(err) = self.store.clear_match(&self.match_id) {
            log::warn!("could not clear slices for {}: {}", self.match_id, err);
        }
    }

    fn guard_transition(&self, to: &MatchPhase) -> Result<()> {
        if self.phase.can_transition_to(to) {
            Ok(())
        } else {
            Err(ConsoleError::InvalidTransition {
                from: self.phase.clone(),
                to: to.clone(),
            })
        }
    }

    // ========================
    // Clock
    // ========================

    /// Start the match clock; on-pitch players resume accruing time.
    pub fn start_clock(&mut self, now_ms: u64) -> Result<()> {
        self.guard_clock()?;
        if !self.clock.running() {
            self.clock.start(now_ms);
            let fielders = self.on_pitch_entities();
            self.time_sheet.resume(fielders, now_ms);
            self.persist(&[SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        }
        Ok(())
    }

    /// Pause the match clock; on-pitch accrual suspends with it.
    pub fn pause_clock(&mut self, now_ms: u64) -> Result<()> {
        self.guard_clock()?;
        if self.clock.running() {
            self.clock.pause(now_ms);
            self.time_sheet.suspend_all(now_ms);
            self.persist(&[SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        }
        Ok(())
    }

    pub fn toggle_clock(&mut self, now_ms: u64) -> Result<()> {
        if self.clock.running() {
            self.pause_clock(now_ms)
        } else {
            self.start_clock(now_ms)
        }
    }

    /// Zero the clock. Accumulated player time is preserved (folded), not
    /// altered.
    pub fn reset_clock(&mut self, now_ms: u64) -> Result<()> {
        self.guard_clock()?;
        self.time_sheet.suspend_all(now_ms);
        self.clock.reset();
        self.persist(&[SnapshotKey::Clock, SnapshotKey::TimeAccounts]);
        Ok(())
    }

    fn guard_clock(&self) -> Result<()> {
        if self.phase.clock_allowed() {
            Ok(())
        } else {
            Err(ConsoleError::ClockLocked(self.phase.clone()))
        }
    }

    // ========================
    // Pending confirmations
    // ========================

    /// Propose a risky operation; it must be confirmed within the
    /// countdown or it auto-cancels.
    pub fn propose(&mut self, op: GuardedOp, now_ms: u64) -> PendingConfirmation {
        self.gate.propose(op, now_ms)
    }

    /// Confirm the pending operation. Executes it when the deadline was
    /// met; reports `None` when it had already expired or nothing was
    /// pending.
    pub fn confirm_pending(&mut self, now_ms: u64) -> Result<Option<GuardedOp>> {
        match self.gate.confirm(now_ms) {
            ConfirmOutcome::Confirmed(op) => {
                match op {
                    GuardedOp::ClockToggle => self.toggle_clock(now_ms)?,
                    GuardedOp::ScoreAdjust { team, delta } => {
                        self.record_score_correction(team, delta, now_ms)?;
                    }
                }
                Ok(Some(op))
            }
            ConfirmOutcome::Expired(op) => {
                self.signals.push(ConsoleSignal::PendingExpired { op });
                Ok(None)
            }
            ConfirmOutcome::Nothing => Ok(None),
        }
    }

    pub fn cancel_pending(&mut self) -> Option<GuardedOp> {
        self.gate.cancel()
    }

    pub fn pending(&self) -> Option<PendingConfirmation> {
        self.gate.pending()
    }

    // ========================
    // Input mode
    // ========================

    /// Arm an action awaiting its target. Clears any pending slot
    /// selection (the two are mutually exclusive).
    pub fn arm_action(&mut self, action: ActionType) {
        self.input_mode = InputMode::ArmedAction(action);
    }

    /// Arm a slot selection awaiting a player. Clears any pending action.
    pub fn arm_slot(&mut self, slot: PitchSlot) {
        self.input_mode = InputMode::ArmedSlot(slot);
    }

    pub fn clear_input(&mut self) {
        self.input_mode = InputMode::Idle;
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    // ========================
    // Assignments
    // ========================

    /// Put a club player on a pitch position.
    ///
    /// Moving a player between slots is atomic: the previous slot is
    /// vacated in the same call and exactly one exit+enter pair is
    /// recorded. A displaced occupant gets an exit record. During `Setup`
    /// the board mutates silently (lineup building).
    pub fn assign(&mut self, entity: EntityRef, slot: PitchSlot, now_ms: u64) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(ConsoleError::RecordingClosed(self.phase.clone()));
        }
        if !matches!(entity, EntityRef::Player(_)) {
            return Err(ConsoleError::NotAssignable(entity));
        }
        if !self.roster.knows(entity) {
            return Err(ConsoleError::UnknownEntity(entity));
        }

        let change = self.board.assign(entity, slot);
        if change.previous_slot == Some(slot) {
            return Ok(()); // Already there.
        }
        self.input_mode = InputMode::Idle;

        if self.phase.recording_allowed() {
            if let Some(displaced) = change.displaced {
                self.time_sheet.deactivate(displaced, now_ms);
                self.log_action(
                    Some(displaced),
                    TeamSide::Home,
                    ActionType::PitchExit,
                    Some(ActionDetail::for_slot(slot)),
                    now_ms,
                );
            }
            match change.previous_slot {
                Some(previous) => {
                    // Move within the pitch: the account stays live.
                    self.log_action(
                        Some(entity),
                        TeamSide::Home,
                        ActionType::PitchExit,
                        Some(ActionDetail::for_slot(previous)),
                        now_ms,
                    );
                    self.log_action(
                        Some(entity),
                        TeamSide::Home,
                        ActionType::PitchEntry,
                        Some(ActionDetail::for_slot(slot)),
                        now_ms,
                    );
                }
                None => {
                    if self.clock.running() {
                        self.time_sheet.activate(entity, now_ms);
                    }
                    self.log_action(
                        Some(entity),
                        TeamSide::Home,
                        ActionType::PitchEntry,
                        Some(ActionDetail::for_slot(slot)),
                        now_ms,
                    );
                }
            }
            self.persist(&[
                SnapshotKey::Assignments,
                SnapshotKey::TimeAccounts,
                SnapshotKey::History,
            ]);
        } else {
            self.persist(&[SnapshotKey::Assignments]);
        }
        Ok(())
    }

    /// Vacate a pitch position, recording the occupant's exit.
    pub fn unassign(&mut self, slot: PitchSlot, now_ms: u64) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(ConsoleError::RecordingClosed(self.phase.clone()));
        }

        if let Some(occupant) = self.board.clear(slot) {
            self.input_mode = InputMode::Idle;
            if self.phase.recording_allowed() {
                self.time_sheet.deactivate(occupant, now_ms);
                self.log_action(
                    Some(occupant),
                    TeamSide::Home,
                    ActionType::PitchExit,
                    Some(ActionDetail::for_slot(slot)),
                    now_ms,
                );
                self.persist(&[
                    SnapshotKey::Assignments,
                    SnapshotKey::TimeAccounts,
                    SnapshotKey::History,
                ]);
            } else {
                self.persist(&[SnapshotKey::Assignments]);
            }
        }
        Ok(())
    }

    /// Toggle a visiting shirt number on or off the pitch. Visitors carry
    /// no position; their on/off set and time accounts are still tracked.
    pub fn set_visitor_active(&mut self, number: u8, active: bool, now_ms: u64) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(ConsoleError::RecordingClosed(self.phase.clone()));
        }
        if self.visiting.is_active(number) == active {
            return Ok(());
        }

        let entity = EntityRef::Visitor(number);
        if active {
            self.visiting.activate(number);
            if self.phase.recording_allowed() {
                if self.clock.running() {
                    self.time_sheet.activate(entity, now_ms);
                }
                self.log_action(Some(entity), TeamSide::Away, ActionType::PitchEntry, None, now_ms);
            }
        } else {
            self.visiting.deactivate(number);
            if self.phase.recording_allowed() {
                self.time_sheet.deactivate(entity, now_ms);
                self.log_action(Some(entity), TeamSide::Away, ActionType::PitchExit, None, now_ms);
            }
        }

        if self.phase.recording_allowed() {
            self.persist(&[
                SnapshotKey::Visiting,
                SnapshotKey::TimeAccounts,
                SnapshotKey::History,
            ]);
        } else {
            self.persist(&[SnapshotKey::Visiting]);
        }
        Ok(())
    }

    /// Attach a display name to a visiting shirt number.
    pub fn set_visitor_alias(&mut self, number: u8, name: Option<String>) {
        self.visiting.set_name_override(number, name);
        self.persist(&[SnapshotKey::Visiting]);
    }

    /// Entities currently on the pitch, both sides.
    fn on_pitch_entities(&self) -> Vec<EntityRef> {
        self.board
            .fielders()
            .chain(self.visiting.active_numbers().map(EntityRef::Visitor))
            .collect()
    }

    // ========================
    // Recording
    // ========================

    /// Record an entity action (goal, card, foul, save, assist).
    ///
    /// Timeouts, score corrections and pitch movements go through their
    /// dedicated operations.
    pub fn record_action(
        &mut self,
        entity: EntityRef,
        action: ActionType,
        now_ms: u64,
    ) -> Result<ActionRecord> {
        if matches!(
            action,
            ActionType::Timeout
                | ActionType::ScoreCorrection
                | ActionType::PitchEntry
                | ActionType::PitchExit
        ) {
            return Err(ConsoleError::DedicatedOperation(action));
        }
        self.guard_recording()?;
        if !self.roster.knows(entity) {
            return Err(ConsoleError::UnknownEntity(entity));
        }

        let team = self.team_of(entity);
        let record = self.log_action(Some(entity), team, action, None, now_ms);
        self.persist(&[SnapshotKey::History, SnapshotKey::Counters]);
        Ok(record)
    }

    /// Record a team timeout: at most one per team per half.
    pub fn record_timeout(&mut self, team: TeamSide, now_ms: u64) -> Result<ActionRecord> {
        self.guard_recording()?;
        if self.ledger.timeouts.is_used(team, self.period) {
            return Err(ConsoleError::TimeoutExhausted { team, period: self.period });
        }

        let record = self.log_action(None, team, ActionType::Timeout, None, now_ms);
        self.persist(&[SnapshotKey::History, SnapshotKey::Timeouts]);
        Ok(record)
    }

    /// Manual score correction. Guarded against zero deltas and negative
    /// totals so apply/revert stay exact inverses.
    pub fn record_score_correction(
        &mut self,
        team: TeamSide,
        delta: i8,
        now_ms: u64,
    ) -> Result<ActionRecord> {
        self.guard_recording()?;
        if delta == 0 {
            return Err(ConsoleError::EmptyCorrection);
        }
        let current = match team {
            TeamSide::Home => self.ledger.score.home,
            TeamSide::Away => self.ledger.score.away,
        };
        if delta < 0 && current < delta.unsigned_abs() {
            return Err(ConsoleError::ScoreAtFloor { team });
        }

        let record = self.log_action(
            None,
            team,
            ActionType::ScoreCorrection,
            Some(ActionDetail::for_delta(delta)),
            now_ms,
        );
        self.persist(&[SnapshotKey::History, SnapshotKey::Counters]);
        Ok(record)
    }

    /// Undo the most recent action.
    ///
    /// Reverts the statistics ledger exactly; deliberately does NOT
    /// reverse pitch-time accounting or board state (undo fixes recording
    /// mistakes, not substitutions). See
    /// [`MatchSession::undo_last_reversing_time`] for the stricter
    /// variant. Empty history is a logged no-op.
    pub fn undo_last(&mut self, _now_ms: u64) -> Option<ActionRecord> {
        let record = match self.history.pop_last() {
            Some(record) => record,
            None => {
                log::warn!("{}: undo requested on empty history", self.match_id);
                return None;
            }
        };

        self.ledger.revert(&record);
        log::info!(
            "{}: undid {:?} at minute {}",
            self.match_id,
            record.action,
            record.match_minute
        );
        self.persist(&[
            SnapshotKey::History,
            SnapshotKey::Counters,
            SnapshotKey::Timeouts,
        ]);
        Some(record)
    }

    /// Undo that additionally reverses pitch-time accounting.
    ///
    /// Best effort: it assumes the undo follows the mistaken record
    /// promptly — an entry undo drops the in-flight segment, an exit undo
    /// resumes accrual from the recorded exit instant.
    pub fn undo_last_reversing_time(&mut self, now_ms: u64) -> Option<ActionRecord> {
        let record = self.undo_last(now_ms)?;
        if let Some(entity) = record.entity {
            match record.action {
                ActionType::PitchEntry => self.time_sheet.cancel_active(entity),
                ActionType::PitchExit if self.clock.running() => {
                    self.time_sheet.reactivate_at(entity, record.timestamp_ms);
                }
                _ => {}
            }
            self.persist(&[SnapshotKey::TimeAccounts]);
        }
        Some(record)
    }

    fn guard_recording(&self) -> Result<()> {
        if self.phase.recording_allowed() {
            Ok(())
        } else {
            Err(ConsoleError::RecordingClosed(self.phase.clone()))
        }
    }

    /// Append a record, fold it into the ledger and queue the UI flash.
    /// The single synchronous path every recorded event goes through.
    fn log_action(
        &mut self,
        entity: Option<EntityRef>,
        team: TeamSide,
        action: ActionType,
        detail: Option<ActionDetail>,
        now_ms: u64,
    ) -> ActionRecord {
        let record = ActionRecord {
            id: Uuid::new_v4(),
            entity,
            team,
            action,
            period: self.period,
            match_minute: self.clock.match_minute(now_ms),
            timestamp_ms: now_ms,
            detail,
        };

        let outcome = self.ledger.apply(&record);
        if outcome.foul_bonus {
            self.signals.push(ConsoleSignal::FoulBonus { team: record.team, period: record.period });
        }
        self.signals.push(ConsoleSignal::ActionFlash { action_id: record.id, action });
        self.history.push(record.clone());
        record
    }

    fn team_of(&self, entity: EntityRef) -> TeamSide {
        match entity {
            EntityRef::Player(_) | EntityRef::Staff(_) => TeamSide::Home,
            EntityRef::Visitor(_) => TeamSide::Away,
        }
    }

    // ========================
    // Periodic maintenance
    // ========================

    /// Time-based maintenance: the lineup watchdog and the pending-op
    /// sweep. Pure with respect to match state; safe at any cadence.
    pub fn tick(&mut self, now_ms: u64) {
        if self.phase.is_live() {
            let complete = self.board.is_complete();
            if self.watchdog.observe(complete, now_ms) {
                self.signals.push(ConsoleSignal::MissingPlayers {
                    assigned: self.board.assigned_count(),
                });
            }
        } else {
            self.watchdog.reset();
        }

        if let Some(op) = self.gate.sweep(now_ms) {
            self.signals.push(ConsoleSignal::PendingExpired { op });
        }
    }

    pub fn drain_signals(&mut self) -> Vec<ConsoleSignal> {
        self.signals.drain()
    }

    // ========================
    // Reads
    // ========================

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn phase(&self) -> &MatchPhase {
        &self.phase
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn score(&self) -> ScoreLine {
        self.ledger.score
    }

    pub fn clock_running(&self) -> bool {
        self.clock.running()
    }

    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        self.clock.elapsed_seconds(now_ms)
    }

    pub fn match_minute(&self, now_ms: u64) -> u8 {
        self.clock.match_minute(now_ms)
    }

    pub fn foul_count(&self, team: TeamSide, period: Period) -> u8 {
        self.ledger.fouls.count(team, period)
    }

    pub fn timeout_used(&self, team: TeamSide, period: Period) -> bool {
        self.ledger.timeouts.is_used(team, period)
    }

    pub fn stats(&self, entity: EntityRef) -> super::ledger::StatEntry {
        self.ledger.entry(entity)
    }

    pub fn minutes_played(&self, entity: EntityRef, now_ms: u64) -> u32 {
        self.time_sheet.minutes_played(entity, now_ms)
    }

    pub fn assignments(&self) -> &AssignmentBoard {
        &self.board
    }

    pub fn visiting(&self) -> &VisitingSquad {
        &self.visiting
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    // ========================
    // Finalize
    // ========================

    /// Assemble the finalize payload from the current state.
    pub fn build_report(&self, now_ms: u64) -> MatchReport {
        let players = self
            .roster
            .players
            .iter()
            .map(|player| {
                let entity = EntityRef::Player(player.id);
                let stats = self.ledger.entry(entity);
                PlayerReportLine {
                    id: player.id,
                    minutes_played: self.time_sheet.minutes_played(entity, now_ms),
                    goals: stats.goals,
                    assists: stats.assists,
                    fouls: stats.fouls,
                    yellow_cards: stats.yellow_cards,
                    red_cards: stats.red_cards,
                    saves: stats.saves,
                }
            })
            .collect();

        let staff = self
            .roster
            .staff
            .iter()
            .map(|staff| {
                let stats = self.ledger.entry(EntityRef::Staff(staff.role));
                StaffReportLine {
                    role: staff.role,
                    yellow_cards: stats.yellow_cards,
                    red_cards: stats.red_cards,
                }
            })
            .collect();

        MatchReport {
            match_id: self.match_id.clone(),
            score: self.ledger.score,
            fouls_by_half: self.ledger.fouls.by_half(),
            players,
            staff,
            action_history: self.history.records().to_vec(),
            finished_at_ms: now_ms,
        }
    }

    /// Submit the final summary. Success clears the match's local slices;
    /// failure leaves memory and store untouched so the operator can
    /// retry.
    pub fn finalize(
        &mut self,
        backend: &dyn MatchBackend,
        now_ms: u64,
    ) -> std::result::Result<MatchReport, SubmitError> {
        if !self.phase.is_terminal() {
            return Err(ConsoleError::InvalidTransition {
                from: self.phase.clone(),
                to: MatchPhase::Finished,
            }
            .into());
        }

        let report = self.build_report(now_ms);
        backend.finalize_match(&self.match_id, &report)?;

        if let Err(err) = self.store.clear_match(&self.match_id) {
            log::warn!("finalized but could not clear slices for {}: {}", self.match_id, err);
        }
        log::info!("{}: report submitted", self.match_id);
        Ok(report)
    }

    // ========================
    // Persistence mirror
    // ========================

    /// Mirror the given slices to the store. Write failures are logged and
    /// swallowed: the in-memory state stays authoritative and a later
    /// mutation will retry the slice.
    fn persist(&mut self, keys: &[SnapshotKey]) {
        for &key in keys {
            let encoded = match key {
                SnapshotKey::Phase => encode_slice(&PhaseSlice {
                    phase: self.phase.clone(),
                    period: self.period,
                }),
                SnapshotKey::Assignments => encode_slice(&self.board),
                SnapshotKey::Visiting => encode_slice(&self.visiting),
                SnapshotKey::Clock => encode_slice(&self.clock),
                SnapshotKey::TimeAccounts => encode_slice(&TimeAccountsSlice {
                    entries: self.time_sheet.entries(),
                }),
                SnapshotKey::Counters => encode_slice(&CountersSlice {
                    entries: self.ledger.entry_list(),
                    score: self.ledger.score,
                    fouls: self.ledger.fouls,
                }),
                SnapshotKey::Timeouts => encode_slice(&self.ledger.timeouts),
                SnapshotKey::History => encode_slice(&HistorySlice {
                    records: self.history.records().to_vec(),
                }),
            };

            match encoded {
                Ok(bytes) => {
                    if let Err(err) = self.store.write(&self.match_id, key, &bytes) {
                        log::warn!(
                            "failed to persist {:?} for {}: {}",
                            key,
                            self.match_id,
                            err
                        );
                    }
                }
                Err(err) => {
                    log::warn!("failed to encode {:?} for {}: {}", key, self.match_id, err)
                }
            }
        }
    }
}
