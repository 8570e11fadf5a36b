//! Static league table.
//!
//! Each supported league carries its API-Football id, the fallback team
//! ids used to skip the remote name search for common clubs, and a short
//! list of demo fixtures for the match picker.

use serde::Serialize;

/// Key used when a league id has no entry in the table.
pub const UNKNOWN_LEAGUE: &str = "unknown";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct League {
    pub id: u32,
    pub name: &'static str,
    /// Lowercased name; the key of the fallback table.
    #[serde(skip)]
    pub key: &'static str,
    #[serde(skip)]
    pub fallback_ids: &'static [(&'static str, u32)],
    pub fixtures: &'static [(&'static str, &'static str)],
}

impl League {
    /// Fallback id for an already-normalized team name.
    pub fn fallback_id(&self, normalized_name: &str) -> Option<u32> {
        self.fallback_ids
            .iter()
            .find(|(name, _)| *name == normalized_name)
            .map(|(_, id)| *id)
    }

    /// Fixture labels as shown in the picker ("Home vs Away").
    pub fn fixture_labels(&self) -> Vec<String> {
        self.fixtures
            .iter()
            .map(|(home, away)| format!("{home} vs {away}"))
            .collect()
    }
}

pub const LEAGUES: &[League] = &[
    League {
        id: 39,
        name: "Premier League",
        key: "premier league",
        fallback_ids: &[
            ("southampton", 41),
            ("aston villa", 66),
            ("manchester city", 50),
            ("crystal palace", 52),
            ("arsenal", 42),
            ("chelsea", 49),
            ("liverpool", 40),
            ("manchester united", 33),
        ],
        fixtures: &[
            ("Southampton", "Aston Villa"),
            ("Manchester City", "Crystal Palace"),
            ("Arsenal", "Chelsea"),
            ("Liverpool", "Manchester United"),
            ("Tottenham", "West Ham"),
        ],
    },
    League {
        id: 140,
        name: "La Liga",
        key: "la liga",
        fallback_ids: &[("barcelona", 529), ("real madrid", 541)],
        fixtures: &[
            ("Barcelona", "Real Madrid"),
            ("Atlético Madrid", "Sevilla"),
            ("Villarreal", "Valencia"),
            ("Real Betis", "Celta Vigo"),
        ],
    },
    League {
        id: 135,
        name: "Serie A",
        key: "serie a",
        fallback_ids: &[("juventus", 496), ("inter milan", 505)],
        fixtures: &[
            ("Juventus", "Inter Milan"),
            ("AC Milan", "Napoli"),
            ("Roma", "Lazio"),
            ("Fiorentina", "Atalanta"),
        ],
    },
    League {
        id: 40,
        name: "EFL League One",
        key: "efl league one",
        fallback_ids: &[("birmingham city", 332), ("wrexham", 346)],
        fixtures: &[
            ("Birmingham City", "Wrexham"),
            ("Huddersfield Town", "Stockport County"),
            ("Lincoln City", "Bolton"),
            ("Charlton Athletic", "Barnsley"),
        ],
    },
    League {
        id: 186,
        name: "PSL (South Africa)",
        key: "psl (south africa)",
        fallback_ids: &[("mamelodi sundowns", 1007), ("orlando pirates", 1010)],
        fixtures: &[
            ("Mamelodi Sundowns", "Orlando Pirates"),
            ("Kaizer Chiefs", "Cape Town City"),
            ("Stellenbosch", "SuperSport United"),
            ("Sekhukhune United", "AmaZulu"),
        ],
    },
];

pub fn league_by_id(id: u32) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.id == id)
}

/// Fallback-table key for a league id, `"unknown"` when unmapped.
pub fn league_key(id: u32) -> &'static str {
    league_by_id(id).map(|l| l.key).unwrap_or(UNKNOWN_LEAGUE)
}

/// Two-level lookup: league id → league key → normalized team name → id.
pub fn fallback_team_id(league_id: u32, normalized_name: &str) -> Option<u32> {
    league_by_id(league_id).and_then(|l| l.fallback_id(normalized_name))
}
