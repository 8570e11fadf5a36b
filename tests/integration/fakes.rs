//! Deterministic stand-ins for the outbound services.
//!
//! All state is in-memory. Teams, statistics, fixtures and model replies
//! are fully controllable from test code, and every call is counted.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use club_predictor::data::SportsDataSource;
use club_predictor::engine::pipeline::Predictor;
use club_predictor::llm::runlog::{RunLogger, RunRecord};
use club_predictor::llm::ChatModel;
use club_predictor::types::{FixtureSide, HeadToHeadMatch, TeamCandidate, TeamStatistics};

#[derive(Default)]
pub struct FakeFootball {
    pub teams: Vec<TeamCandidate>,
    pub stats: HashMap<u32, TeamStatistics>,
    pub h2h: Vec<HeadToHeadMatch>,
    /// If set, every call fails with this message.
    pub outage: Option<String>,
    pub searches: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub h2h_calls: AtomicUsize,
}

impl FakeFootball {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, id: u32, name: &str) -> Self {
        self.teams.push(TeamCandidate { id, name: name.to_string() });
        self
    }

    pub fn with_stats(mut self, id: u32, form: &str, played: u32, corners: u32) -> Self {
        self.stats.insert(
            id,
            TeamStatistics {
                form: Some(form.to_string()),
                matches_played: Some(played),
                total_corners: Some(corners),
            },
        );
        self
    }

    pub fn with_h2h(mut self, home: (u32, Option<bool>), away: (u32, Option<bool>)) -> Self {
        self.h2h.push(HeadToHeadMatch {
            home: FixtureSide { id: Some(home.0), winner: home.1 },
            away: FixtureSide { id: Some(away.0), winner: away.1 },
        });
        self
    }

    pub fn down(mut self, msg: &str) -> Self {
        self.outage = Some(msg.to_string());
        self
    }

    fn check(&self) -> Result<()> {
        match &self.outage {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SportsDataSource for FakeFootball {
    async fn search_teams(&self, name: &str) -> Result<Vec<TeamCandidate>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let needle = name.to_lowercase();
        Ok(self
            .teams
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn team_statistics(&self, team_id: u32, _league_id: u32, _season: u16) -> Result<Option<TeamStatistics>> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.stats.get(&team_id).cloned())
    }

    async fn head_to_head(&self, _team1_id: u32, _team2_id: u32) -> Result<Vec<HeadToHeadMatch>> {
        self.h2h_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.h2h.clone())
    }
}

/// Returns a fixed reply, or fails when built with [`FakeModel::failing`].
pub struct FakeModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing(reason: &str) -> Self {
        Self { reply: Err(reason.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow!("{e}"))
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    pub runs: Mutex<Vec<RunRecord>>,
}

impl RunLogger for RecordingLogger {
    fn record(&self, run: RunRecord) {
        self.runs.lock().unwrap().push(run);
    }

    fn run_name(&self) -> &str {
        "integration"
    }
}

pub const GOOD_REPLY: &str = "Prediction: Arsenal\n\
Score: 2-1\n\
Corners: 10-8\n\
Shots: 14-9\n\
Reasoning: Arsenal's home form is strong.";

/// The stock Premier League setup: Arsenal (42) and Chelsea (49).
pub fn premier_league() -> FakeFootball {
    FakeFootball::new()
        .with_team(42, "Arsenal")
        .with_team(49, "Chelsea")
        .with_stats(42, "WWDWL", 10, 55)
        .with_stats(49, "LDWWD", 10, 48)
        .with_h2h((42, Some(true)), (49, Some(false)))
        .with_h2h((49, Some(true)), (42, Some(false)))
}

pub struct Harness {
    pub source: Arc<FakeFootball>,
    pub model: Arc<FakeModel>,
    pub logger: Arc<RecordingLogger>,
}

impl Harness {
    pub fn new(source: FakeFootball, model: FakeModel) -> Self {
        Self {
            source: Arc::new(source),
            model: Arc::new(model),
            logger: Arc::new(RecordingLogger::default()),
        }
    }

    pub fn predictor(&self) -> Predictor {
        Predictor::new(self.source.clone(), self.model.clone(), self.logger.clone(), 2024)
    }
}
