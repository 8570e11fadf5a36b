//! Sports data access.
//!
//! Defines the `SportsDataSource` trait over the remote statistics API,
//! the API-Football implementation, the team resolver and the degrading
//! fetchers the pipeline calls.

pub mod fetcher;
pub mod football;
pub mod resolver;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{HeadToHeadMatch, TeamCandidate, TeamStatistics};

/// Abstraction over the remote sports statistics API.
///
/// Implementations report transport and HTTP failures as `Err`; the
/// fetchers and the resolver decide how each failure degrades.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SportsDataSource: Send + Sync {
    /// Name search across all leagues.
    async fn search_teams(&self, name: &str) -> Result<Vec<TeamCandidate>>;

    /// Season statistics. `Ok(None)` when the envelope carries no payload.
    async fn team_statistics(
        &self,
        team_id: u32,
        league_id: u32,
        season: u16,
    ) -> Result<Option<TeamStatistics>>;

    /// Past meetings between two teams.
    async fn head_to_head(&self, team1_id: u32, team2_id: u32) -> Result<Vec<HeadToHeadMatch>>;
}
