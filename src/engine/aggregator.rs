//! Stat aggregation: raw statistics + head-to-head → the summary block
//! handed to the language model.

use serde::Serialize;
use std::fmt;

use crate::types::{AverageCorners, HeadToHeadMatch, TeamIdentity, TeamStatistics};

const UNKNOWN: &str = "Unknown";

/// Head-to-head win counts.
///
/// Team 1 is credited only for home wins and team 2 only for away wins,
/// so a team 1 away win or a team 2 home win counts for nobody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHeadTally {
    pub team1_wins: u32,
    pub team2_wins: u32,
}

pub fn count_h2h_wins(h2h: &[HeadToHeadMatch], team1_id: u32, team2_id: u32) -> HeadToHeadTally {
    h2h.iter().fold(HeadToHeadTally::default(), |mut tally, m| {
        if m.home.id == Some(team1_id) && m.home.won() {
            tally.team1_wins += 1;
        }
        if m.away.id == Some(team2_id) && m.away.won() {
            tally.team2_wins += 1;
        }
        tally
    })
}

/// One team's line items in the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub name: String,
    pub form: Option<String>,
    pub average_corners: AverageCorners,
}

impl TeamSummary {
    fn from_stats(name: &str, stats: Option<&TeamStatistics>) -> Self {
        Self {
            name: name.to_string(),
            form: stats.and_then(|s| s.form.clone()),
            average_corners: stats
                .map(TeamStatistics::average_corners)
                .unwrap_or(AverageCorners::Unknown),
        }
    }

    fn form_or_unknown(&self) -> &str {
        self.form.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Aggregated match data. `Display` renders the fixed-layout text block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub league: String,
    pub season: u16,
    pub team1: TeamSummary,
    pub team2: TeamSummary,
    pub h2h: HeadToHeadTally,
}

impl StatsSummary {
    /// "2024/25" for season 2024.
    pub fn season_label(&self) -> String {
        format!("{}/{:02}", self.season, (u32::from(self.season) + 1) % 100)
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (t1, t2) = (&self.team1, &self.team2);
        writeln!(f, "Club Match Data ({}, {} Season):", self.league, self.season_label())?;
        writeln!(f, "- {} Form (Last 5): {}", t1.name, t1.form_or_unknown())?;
        writeln!(f, "- {} Form (Last 5): {}", t2.name, t2.form_or_unknown())?;
        writeln!(f, "- Head-to-Head (Recent):")?;
        writeln!(f, "  * {} Wins: {}", t1.name, self.h2h.team1_wins)?;
        writeln!(f, "  * {} Wins: {}", t2.name, self.h2h.team2_wins)?;
        write!(
            f,
            "- Avg Corners: {} ({}), {} ({})",
            t1.average_corners, t1.name, t2.average_corners, t2.name
        )
    }
}

/// Pure aggregation. Both identities must already be resolved; an
/// unresolved id simply matches no head-to-head side.
pub fn aggregate(
    league: &str,
    season: u16,
    team1: &TeamIdentity,
    team2: &TeamIdentity,
    team1_stats: Option<&TeamStatistics>,
    team2_stats: Option<&TeamStatistics>,
    h2h: &[HeadToHeadMatch],
) -> StatsSummary {
    let h2h = match (team1.resolved_id, team2.resolved_id) {
        (Some(id1), Some(id2)) => count_h2h_wins(h2h, id1, id2),
        _ => HeadToHeadTally::default(),
    };

    StatsSummary {
        league: league.to_string(),
        season,
        team1: TeamSummary::from_stats(&team1.name, team1_stats),
        team2: TeamSummary::from_stats(&team2.name, team2_stats),
        h2h,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
