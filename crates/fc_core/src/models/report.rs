use serde::{Deserialize, Serialize};

use super::entity::StaffRole;
use super::events::ActionRecord;

/// Final score line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScoreLine {
    pub home: u8,
    pub away: u8,
}

/// Accumulated team fouls split by half.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FoulsByHalf {
    pub home_first: u8,
    pub home_second: u8,
    pub away_first: u8,
    pub away_second: u8,
}

/// Per-player line of the finalize payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlayerReportLine {
    pub id: u32,
    pub minutes_played: u32,
    pub goals: u16,
    pub assists: u16,
    pub fouls: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub saves: u16,
}

/// Per-staff line of the finalize payload. Staff only collect cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffReportLine {
    pub role: StaffRole,
    pub yellow_cards: u16,
    pub red_cards: u16,
}

/// Aggregated match summary submitted to the backend on finish.
///
/// The server receives this once; it has no authority over the live clock
/// and never sees intermediate state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub match_id: String,
    pub score: ScoreLine,
    pub fouls_by_half: FoulsByHalf,
    pub players: Vec<PlayerReportLine>,
    pub staff: Vec<StaffReportLine>,
    pub action_history: Vec<ActionRecord>,
    /// Wall-clock unix milliseconds when the match was finished.
    pub finished_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let report = MatchReport {
            match_id: "m-17".to_string(),
            score: ScoreLine { home: 3, away: 1 },
            fouls_by_half: FoulsByHalf::default(),
            players: vec![PlayerReportLine { id: 7, goals: 2, ..Default::default() }],
            staff: Vec::new(),
            action_history: Vec::new(),
            finished_at_ms: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"]["home"], 3);
        assert_eq!(json["players"][0]["goals"], 2);
        assert_eq!(json["match_id"], "m-17");
    }
}
