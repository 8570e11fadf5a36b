//! The prediction pipeline.
//!
//! resolve → fetch stats (team 1, team 2) → fetch head-to-head →
//! aggregate → predict → parse. Every stage is awaited in turn; only a
//! failed resolution or an invalid selection aborts the request.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppConfig, Credentials};
use crate::data::fetcher::MatchDataFetcher;
use crate::data::football::ApiFootballClient;
use crate::data::resolver::TeamResolver;
use crate::data::SportsDataSource;
use crate::engine::aggregator::{self, StatsSummary};
use crate::error::PredictorError;
use crate::leagues;
use crate::llm::openai::OpenAiClient;
use crate::llm::parser::{MarkerReplyParser, ReplyParser};
use crate::llm::runlog::{self, RunLogger};
use crate::llm::{ChatModel, PredictionEngine};
use crate::types::{MatchSelection, PredictionRequest, PredictionResult, TeamIdentity};

/// Everything the caller needs to display one prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub team1: TeamIdentity,
    pub team2: TeamIdentity,
    pub league: String,
    pub summary: StatsSummary,
    pub stats_summary: String,
    pub raw_reply: String,
    pub result: PredictionResult,
    /// Set when the model call failed and `raw_reply` is synthetic.
    pub engine_error: Option<String>,
}

pub struct Predictor {
    resolver: TeamResolver,
    fetcher: MatchDataFetcher,
    engine: PredictionEngine,
    parser: Box<dyn ReplyParser>,
}

impl Predictor {
    pub fn new(
        source: Arc<dyn SportsDataSource>,
        model: Arc<dyn ChatModel>,
        run_logger: Arc<dyn RunLogger>,
        season: u16,
    ) -> Self {
        Self {
            resolver: TeamResolver::new(source.clone()),
            fetcher: MatchDataFetcher::new(source, season),
            engine: PredictionEngine::new(model, run_logger),
            parser: Box::new(MarkerReplyParser),
        }
    }

    /// Swap the reply contract without touching the rest of the pipeline.
    pub fn with_parser(mut self, parser: Box<dyn ReplyParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Wire the production clients from config and resolved credentials.
    pub fn from_config(cfg: &AppConfig, creds: Credentials) -> Result<Self> {
        let source = Arc::new(ApiFootballClient::new(&cfg.sports_api, &creds.sports_api_key)?);
        let model = Arc::new(OpenAiClient::new(&cfg.llm, creds.llm_api_key)?);
        let run_logger: Arc<dyn RunLogger> =
            Arc::from(runlog::from_config(&cfg.run_log, creds.run_log_api_key)?);

        info!(
            model = %model.model_name(),
            season = cfg.sports_api.season,
            "Predictor initialised"
        );

        Ok(Self::new(source, model, run_logger, cfg.sports_api.season))
    }

    pub fn season(&self) -> u16 {
        self.fetcher.season()
    }

    pub async fn run(&self, selection: &MatchSelection) -> Result<PredictionOutcome, PredictorError> {
        let league = leagues::league_by_id(selection.league_id).ok_or_else(|| {
            PredictorError::InvalidSelection(format!("Unknown league id {}", selection.league_id))
        })?;

        info!(
            league = league.name,
            team1 = %selection.team1,
            team2 = %selection.team2,
            "Prediction requested"
        );

        // Both ids are required before any stats call
        let team1_id = self.resolver.resolve(&selection.team1, league.id).await?;
        let team2_id = self.resolver.resolve(&selection.team2, league.id).await?;
        let team1 = TeamIdentity::new(&selection.team1, league.id).resolved(team1_id);
        let team2 = TeamIdentity::new(&selection.team2, league.id).resolved(team2_id);

        let team1_stats = self.fetcher.fetch_stats(team1_id, league.id).await;
        let team2_stats = self.fetcher.fetch_stats(team2_id, league.id).await;
        let h2h = self.fetcher.fetch_h2h(team1_id, team2_id).await;

        let summary = aggregator::aggregate(
            league.name,
            self.season(),
            &team1,
            &team2,
            team1_stats.as_ref(),
            team2_stats.as_ref(),
            &h2h,
        );
        let stats_summary = summary.to_string();

        let request = PredictionRequest {
            team1: team1.name.clone(),
            team2: team2.name.clone(),
            stats_summary: stats_summary.clone(),
        };
        let reply = self.engine.predict(&request).await;

        let result = match self.parser.parse(&reply.text) {
            Ok(forecast) => PredictionResult::Parsed(forecast),
            Err(e) => {
                warn!(error = %e, "Prediction format error");
                PredictionResult::FormatError {
                    raw_text: reply.text.clone(),
                    error: e.to_string(),
                }
            }
        };

        Ok(PredictionOutcome {
            team1,
            team2,
            league: league.name.to_string(),
            summary,
            stats_summary,
            raw_reply: reply.text,
            result,
            engine_error: reply.error,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
