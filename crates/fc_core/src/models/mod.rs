//! Data model shared across the console: entity references, action records,
//! roster types and the finalize report payload.

pub mod entity;
pub mod events;
pub mod report;
pub mod roster;

pub use entity::{EntityRef, Period, StaffRole, TeamSide};
pub use events::{ActionDetail, ActionRecord, ActionType};
pub use report::{FoulsByHalf, MatchReport, PlayerReportLine, ScoreLine, StaffReportLine};
pub use roster::{ConfirmedRoster, PitchSlot, RosterPlayer, RosterStaff, VisitingSquad};
