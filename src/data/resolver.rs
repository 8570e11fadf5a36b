//! Team name → API-Football team id.
//!
//! Static fallback table first (no network), then one unfiltered name
//! search that only accepts an exact case-insensitive match.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::SportsDataSource;
use crate::error::PredictorError;
use crate::leagues;

/// Trim and lowercase, the form used as fallback-table key.
pub fn normalize_team_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct TeamResolver {
    source: Arc<dyn SportsDataSource>,
}

impl TeamResolver {
    pub fn new(source: Arc<dyn SportsDataSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, name: &str, league_id: u32) -> Result<u32, PredictorError> {
        let normalized = normalize_team_name(name);
        let league = leagues::league_key(league_id);

        if let Some(id) = leagues::fallback_team_id(league_id, &normalized) {
            debug!(team = %normalized, league, id, "Using fallback team id");
            return Ok(id);
        }

        let not_found = || PredictorError::TeamNotFound {
            name: normalized.clone(),
            league_id,
        };

        let candidates = match self.source.search_teams(&normalized).await {
            Ok(c) => c,
            Err(e) => {
                warn!(team = %normalized, league_id, error = %e, "Team search failed");
                return Err(not_found());
            }
        };

        match candidates
            .iter()
            .find(|c| c.name.to_lowercase() == normalized)
        {
            Some(hit) => {
                info!(team = %normalized, id = hit.id, "Resolved team via search");
                Ok(hit.id)
            }
            None => {
                warn!(
                    team = %normalized,
                    league_id,
                    candidates = candidates.len(),
                    "No exact match in team search"
                );
                Err(not_found())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
