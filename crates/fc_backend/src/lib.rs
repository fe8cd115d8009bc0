//! Blocking HTTP implementation of [`fc_core::MatchBackend`].
//!
//! The console makes exactly three calls against the club-management
//! backend: roster fetch, report-exists probe and the one-shot finalize
//! submission. All bodies are JSON.

use std::time::Duration;

use serde::de::DeserializeOwned;

use fc_core::backend::{BackendError, BackendResult, MatchBackend};
use fc_core::models::{ConfirmedRoster, MatchReport};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend client bound to one deployment's base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("fc-console/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn match_url(&self, match_id: &str, tail: &str) -> String {
        format!("{}/matches/{}/{}", self.base_url, match_id, tail)
    }

    fn get_json<T: DeserializeOwned>(&self, url: String) -> BackendResult<T> {
        log::debug!("GET {}", url);
        let response = self.client.get(&url).send().map_err(|e| BackendError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(BackendError::Api { status: status.as_u16(), url, message });
        }

        response
            .json::<T>()
            .map_err(|e| BackendError::Parsing { url, message: e.to_string() })
    }
}

impl MatchBackend for HttpBackend {
    fn confirmed_roster(&self, match_id: &str) -> BackendResult<ConfirmedRoster> {
        self.get_json(self.match_url(match_id, "confirmed-roster"))
    }

    fn report_exists(&self, match_id: &str) -> BackendResult<bool> {
        self.get_json(self.match_url(match_id, "report-exists"))
    }

    fn finalize_match(&self, match_id: &str, report: &MatchReport) -> BackendResult<()> {
        let url = self.match_url(match_id, "finalize");
        log::info!("POST {} ({} actions)", url, report.action_history.len());

        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .map_err(|e| BackendError::Network { url: url.clone(), message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            // Keep the raw body: the operator sees it on the retry banner.
            let message = response.text().unwrap_or_default();
            return Err(BackendError::Api { status: status.as_u16(), url, message });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::models::{FoulsByHalf, ScoreLine};

    fn empty_report(match_id: &str) -> MatchReport {
        MatchReport {
            match_id: match_id.to_string(),
            score: ScoreLine { home: 2, away: 1 },
            fouls_by_half: FoulsByHalf::default(),
            players: Vec::new(),
            staff: Vec::new(),
            action_history: Vec::new(),
            finished_at_ms: 0,
        }
    }

    #[test]
    fn test_confirmed_roster_decodes() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/matches/m-1/confirmed-roster")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"players":[{"id":3,"display_name":"Ana","number":10,"position":"pivot"}],
                    "staff":[{"role":"head_coach","display_name":"Marta"}]}"#,
            )
            .create();

        let backend = HttpBackend::new(server.url());
        let roster = backend.confirmed_roster("m-1").unwrap();
        assert_eq!(roster.players.len(), 1);
        assert_eq!(roster.players[0].number, 10);
        assert_eq!(roster.staff.len(), 1);
    }

    #[test]
    fn test_report_exists_parses_bare_boolean() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/matches/m-1/report-exists")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("true")
            .create();

        let backend = HttpBackend::new(server.url());
        assert!(backend.report_exists("m-1").unwrap());
    }

    #[test]
    fn test_finalize_posts_report() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/matches/m-1/finalize")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "match_id": "m-1",
                "score": { "home": 2, "away": 1 },
            })))
            .with_status(200)
            .create();

        let backend = HttpBackend::new(server.url());
        backend.finalize_match("m-1", &empty_report("m-1")).unwrap();
        mock.assert();
    }

    #[test]
    fn test_finalize_error_surfaces_status_and_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/matches/m-1/finalize")
            .with_status(409)
            .with_body("report already submitted")
            .create();

        let backend = HttpBackend::new(server.url());
        let err = backend.finalize_match("m-1", &empty_report("m-1")).unwrap_err();
        match err {
            BackendError::Api { status, message, .. } => {
                assert_eq!(status, 409);
                assert_eq!(message, "report already submitted");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_host_is_a_network_error() {
        // Reserved TEST-NET address: nothing listens there.
        let backend = HttpBackend::new("http://192.0.2.1:9");
        assert!(matches!(
            backend.report_exists("m-1"),
            Err(BackendError::Network { .. })
        ));
    }
}
