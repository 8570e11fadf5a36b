//! Degrading fetchers for statistics and head-to-head history.
//!
//! Every remote failure is logged and turned into `None` / an empty list
//! here, so the pipeline never aborts on a stats outage.

use std::sync::Arc;
use tracing::{debug, warn};

use super::SportsDataSource;
use crate::error::PredictorError;
use crate::types::{HeadToHeadMatch, TeamStatistics};

const SERVICE: &str = "API-Football";

fn unavailable(e: anyhow::Error) -> PredictorError {
    PredictorError::RemoteUnavailable { service: SERVICE, reason: format!("{e:#}") }
}

pub struct MatchDataFetcher {
    source: Arc<dyn SportsDataSource>,
    season: u16,
}

impl MatchDataFetcher {
    pub fn new(source: Arc<dyn SportsDataSource>, season: u16) -> Self {
        Self { source, season }
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// `None` means unavailable; display fields fall back to "Unknown".
    pub async fn fetch_stats(&self, team_id: u32, league_id: u32) -> Option<TeamStatistics> {
        match self.source.team_statistics(team_id, league_id, self.season).await {
            Ok(Some(stats)) => {
                debug!(team_id, league_id, ?stats, "Team statistics fetched");
                Some(stats)
            }
            Ok(None) => {
                warn!(team_id, league_id, season = self.season, "Statistics response was empty");
                None
            }
            Err(e) => {
                warn!(team_id, league_id, error = %unavailable(e), "Failed to fetch team statistics");
                None
            }
        }
    }

    /// Never fails: an outage yields no meetings.
    pub async fn fetch_h2h(&self, team1_id: u32, team2_id: u32) -> Vec<HeadToHeadMatch> {
        match self.source.head_to_head(team1_id, team2_id).await {
            Ok(matches) => {
                debug!(team1_id, team2_id, meetings = matches.len(), "Head-to-head fetched");
                matches
            }
            Err(e) => {
                warn!(team1_id, team2_id, error = %unavailable(e), "Failed to fetch head-to-head");
                Vec::new()
            }
        }
    }
}
