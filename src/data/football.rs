//! API-Football client (RapidAPI gateway).
//!
//! API: `https://api-football-v1.p.rapidapi.com/v3/`
//! Auth: `X-RapidAPI-Key` + `X-RapidAPI-Host` headers.
//! Envelope: `{"errors": ..., "results": N, "response": ...}` where
//! `response` is an object for statistics and an array for searches and
//! fixtures. Missing keys inside `response` are missing data, not errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::SportsDataSource;
use crate::config::SportsApiConfig;
use crate::types::{FixtureSide, HeadToHeadMatch, TeamCandidate, TeamStatistics};

// ---------------------------------------------------------------------------
// API response types (API-Football JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    /// `[]` on success, an object keyed by cause on failure.
    #[serde(default)]
    errors: Value,
    #[serde(default)]
    response: Value,
}

/// `/teams/statistics` payload; only the fields we read.
#[derive(Debug, Default, Deserialize)]
struct StatisticsPayload {
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    fixtures: Option<FixturesBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct FixturesBlock {
    #[serde(default)]
    played: Option<Tally>,
    #[serde(default)]
    corners: Option<Tally>,
}

#[derive(Debug, Default, Deserialize)]
struct Tally {
    #[serde(default)]
    total: Option<u32>,
}

/// One `/teams?search=` hit.
#[derive(Debug, Deserialize)]
struct TeamEntry {
    #[serde(default)]
    team: Option<TeamInfo>,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: Option<String>,
}

/// One `/fixtures/headtohead` fixture.
#[derive(Debug, Deserialize)]
struct H2hFixture {
    #[serde(default)]
    teams: Option<H2hTeams>,
}

#[derive(Debug, Deserialize)]
struct H2hTeams {
    #[serde(default)]
    home: Option<H2hSide>,
    #[serde(default)]
    away: Option<H2hSide>,
}

#[derive(Debug, Deserialize)]
struct H2hSide {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    winner: Option<bool>,
}

impl From<H2hSide> for FixtureSide {
    fn from(side: H2hSide) -> Self {
        FixtureSide { id: side.id, winner: side.winner }
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

fn has_errors(errors: &Value) -> bool {
    match errors {
        Value::Object(map) => !map.is_empty(),
        Value::Array(list) => !list.is_empty(),
        _ => false,
    }
}

/// `None` unless `response` is an object of the expected shape.
fn parse_statistics(response: Value) -> Option<TeamStatistics> {
    if !response.is_object() {
        return None;
    }
    match serde_json::from_value::<StatisticsPayload>(response) {
        Ok(payload) => {
            let fixtures = payload.fixtures.unwrap_or_default();
            Some(TeamStatistics {
                form: payload.form.filter(|f| !f.is_empty()),
                matches_played: fixtures.played.and_then(|t| t.total),
                total_corners: fixtures.corners.and_then(|t| t.total),
            })
        }
        Err(e) => {
            warn!(error = %e, "Unexpected statistics payload shape");
            None
        }
    }
}

fn parse_candidates(response: Value) -> Vec<TeamCandidate> {
    let Value::Array(entries) = response else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<TeamEntry>(v).ok())
        .filter_map(|entry| {
            let team = entry.team?;
            Some(TeamCandidate { id: team.id?, name: team.name? })
        })
        .collect()
}

fn parse_head_to_head(response: Value) -> Vec<HeadToHeadMatch> {
    let Value::Array(fixtures) = response else {
        return Vec::new();
    };
    fixtures
        .into_iter()
        .filter_map(|v| serde_json::from_value::<H2hFixture>(v).ok())
        .map(|fixture| match fixture.teams {
            Some(teams) => HeadToHeadMatch {
                home: teams.home.map(Into::into).unwrap_or_default(),
                away: teams.away.map(Into::into).unwrap_or_default(),
            },
            None => HeadToHeadMatch::default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiFootballClient {
    http: Client,
    base_url: String,
}

impl ApiFootballClient {
    pub fn new(cfg: &SportsApiConfig, api_key: &SecretString) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .context("Sports API key is not a valid header value")?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-rapidapi-key", key);
        headers.insert(
            "x-rapidapi-host",
            HeaderValue::from_str(&cfg.host).context("Invalid sports API host header")?,
        );

        let http = Client::builder()
            .timeout(cfg.timeout())
            .default_headers(headers)
            .user_agent("club-predictor/0.1.0")
            .build()
            .context("Failed to build sports HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` and return the envelope's `response` member.
    async fn get_response(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, ?query, "API-Football request");

        let resp = self.http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("API-Football request failed: {path}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("API-Football {path} returned {status}: {body}");
        }

        let envelope: Envelope = resp.json().await
            .with_context(|| format!("Failed to parse API-Football response: {path}"))?;

        if has_errors(&envelope.errors) {
            anyhow::bail!("API-Football {path} reported errors: {}", envelope.errors);
        }

        Ok(envelope.response)
    }
}

#[async_trait]
impl SportsDataSource for ApiFootballClient {
    async fn search_teams(&self, name: &str) -> Result<Vec<TeamCandidate>> {
        let response = self.get_response("teams", &[("search", name.to_string())]).await?;
        let candidates = parse_candidates(response);
        debug!(search = name, hits = candidates.len(), "Team search complete");
        Ok(candidates)
    }

    async fn team_statistics(
        &self,
        team_id: u32,
        league_id: u32,
        season: u16,
    ) -> Result<Option<TeamStatistics>> {
        let response = self
            .get_response(
                "teams/statistics",
                &[
                    ("team", team_id.to_string()),
                    ("league", league_id.to_string()),
                    ("season", season.to_string()),
                ],
            )
            .await?;
        Ok(parse_statistics(response))
    }

    async fn head_to_head(&self, team1_id: u32, team2_id: u32) -> Result<Vec<HeadToHeadMatch>> {
        let response = self
            .get_response("fixtures/headtohead", &[("h2h", format!("{team1_id}-{team2_id}"))])
            .await?;
        Ok(parse_head_to_head(response))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
