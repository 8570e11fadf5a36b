//! Shared types for the predictor.
//!
//! Domain values passed between the resolver, the fetchers, the
//! aggregator and the prediction engine. Wire shapes of the remote APIs
//! live next to their clients; these are the normalized forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PredictorError;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Separator between home and away in a fixture label.
pub const FIXTURE_SEPARATOR: &str = " vs ";

/// Two teams in a league, as chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSelection {
    pub league_id: u32,
    pub team1: String,
    pub team2: String,
}

impl MatchSelection {
    /// Two manually entered names. Both must be non-blank.
    pub fn manual(league_id: u32, team1: &str, team2: &str) -> Result<Self, PredictorError> {
        let (team1, team2) = (team1.trim(), team2.trim());
        if team1.is_empty() || team2.is_empty() {
            return Err(PredictorError::InvalidSelection(
                "Please enter both team names".into(),
            ));
        }
        Ok(Self { league_id, team1: team1.to_string(), team2: team2.to_string() })
    }

    /// A picker label such as "Arsenal vs Chelsea".
    pub fn from_fixture(league_id: u32, label: &str) -> Result<Self, PredictorError> {
        let parts: Vec<&str> = label.split(FIXTURE_SEPARATOR).collect();
        match parts.as_slice() {
            [home, away] if !home.trim().is_empty() && !away.trim().is_empty() => {
                Ok(Self {
                    league_id,
                    team1: home.trim().to_string(),
                    team2: away.trim().to_string(),
                })
            }
            _ => Err(PredictorError::InvalidSelection(format!(
                "Invalid match selection: '{label}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A team as requested, plus its API id once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub name: String,
    pub league_id: u32,
    pub resolved_id: Option<u32>,
}

impl TeamIdentity {
    pub fn new(name: impl Into<String>, league_id: u32) -> Self {
        Self { name: name.into(), league_id, resolved_id: None }
    }

    pub fn resolved(mut self, id: u32) -> Self {
        self.resolved_id = Some(id);
        self
    }
}

impl fmt::Display for TeamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved_id {
            Some(id) => write!(f, "{} (#{id})", self.name),
            None => write!(f, "{} (unresolved)", self.name),
        }
    }
}

/// One hit from the remote team search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCandidate {
    pub id: u32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Season statistics snapshot. Every field is optional: an absent key in
/// the remote payload stays `None` instead of becoming a zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub form: Option<String>,
    pub matches_played: Option<u32>,
    pub total_corners: Option<u32>,
}

impl TeamStatistics {
    pub fn average_corners(&self) -> AverageCorners {
        match (self.matches_played, self.total_corners) {
            (Some(played), Some(corners)) if played > 0 => {
                AverageCorners::Known(f64::from(corners) / f64::from(played))
            }
            _ => AverageCorners::Unknown,
        }
    }
}

/// Corners per match, or `Unknown` when it cannot be derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum AverageCorners {
    Known(f64),
    Unknown,
}

impl fmt::Display for AverageCorners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageCorners::Known(v) => write!(f, "{v:.2}"),
            AverageCorners::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One side of a past meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSide {
    pub id: Option<u32>,
    /// `None` when the API reports no winner flag (e.g. a draw).
    pub winner: Option<bool>,
}

impl FixtureSide {
    pub fn won(&self) -> bool {
        self.winner.unwrap_or(false)
    }
}

/// A past meeting between the two teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadMatch {
    pub home: FixtureSide,
    pub away: FixtureSide,
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// The exact inputs handed to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub team1: String,
    pub team2: String,
    pub stats_summary: String,
}

/// The five fields extracted from a well-formed model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchForecast {
    pub winner: String,
    pub score: String,
    pub corners: String,
    pub shots: String,
    pub reasoning: String,
}

/// Reasoning recorded when the reply could not be parsed.
pub const FORMAT_ERROR_REASONING: &str = "Format error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionResult {
    Parsed(MatchForecast),
    FormatError { raw_text: String, error: String },
}

impl PredictionResult {
    pub fn reasoning(&self) -> &str {
        match self {
            PredictionResult::Parsed(f) => &f.reasoning,
            PredictionResult::FormatError { .. } => FORMAT_ERROR_REASONING,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, PredictionResult::Parsed(_))
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// A row in the per-session prediction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub team1: String,
    pub team2: String,
    /// Winner, or the raw reply when parsing failed.
    pub prediction: String,
    pub score: Option<String>,
    pub corners: Option<String>,
    pub shots: Option<String>,
    pub reasoning: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(team1: &str, team2: &str, result: &PredictionResult) -> Self {
        let base = |prediction: String| HistoryEntry {
            team1: team1.to_string(),
            team2: team2.to_string(),
            prediction,
            score: None,
            corners: None,
            shots: None,
            reasoning: result.reasoning().to_string(),
            recorded_at: Utc::now(),
        };

        match result {
            PredictionResult::Parsed(f) => HistoryEntry {
                score: Some(f.score.clone()),
                corners: Some(f.corners.clone()),
                shots: Some(f.shots.clone()),
                ..base(f.winner.clone())
            },
            PredictionResult::FormatError { raw_text, .. } => base(raw_text.clone()),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        write!(
            f,
            "{} vs {} | Winner: {} | Score: {} | Corners: {} | Shots: {} | Reasoning: {}",
            self.team1,
            self.team2,
            self.prediction,
            na(&self.score),
            na(&self.corners),
            na(&self.shots),
            self.reasoning,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
