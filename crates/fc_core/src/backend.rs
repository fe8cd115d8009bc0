//! Contract with the club-management backend.
//!
//! The console only ever needs three calls: the confirmed roster before
//! kickoff, a probe for an already-finalized report at session open, and
//! the one-shot submission of the final summary. The server has no
//! authority over the live clock; everything else stays local.

use thiserror::Error;

use crate::models::{ConfirmedRoster, MatchReport};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("backend returned {status} for {url}: {message}")]
    Api { status: u16, url: String, message: String },

    #[error("could not parse response from {url}: {message}")]
    Parsing { url: String, message: String },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Minimal backend surface the console depends on.
pub trait MatchBackend {
    /// Roster of attendance-confirmed players and staff for the match.
    fn confirmed_roster(&self, match_id: &str) -> BackendResult<ConfirmedRoster>;

    /// Whether a finalized report already exists server-side.
    fn report_exists(&self, match_id: &str) -> BackendResult<bool>;

    /// Submit the final match summary. A failure leaves all local state
    /// intact so the operator can retry.
    fn finalize_match(&self, match_id: &str, report: &MatchReport) -> BackendResult<()>;
}
