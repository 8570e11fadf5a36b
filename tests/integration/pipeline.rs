//! End-to-end runs of the prediction pipeline against the fakes.

use std::sync::atomic::Ordering;

use club_predictor::config::{AppConfig, Credentials};
use club_predictor::error::PredictorError;
use club_predictor::types::{HistoryEntry, MatchSelection, PredictionResult};

use crate::fakes::{premier_league, FakeFootball, FakeModel, Harness, GOOD_REPLY};

#[tokio::test]
async fn test_fixture_prediction_end_to_end() {
    let h = Harness::new(premier_league(), FakeModel::replying(GOOD_REPLY));
    let selection = MatchSelection::from_fixture(39, "Arsenal vs Chelsea").unwrap();

    let outcome = h.predictor().run(&selection).await.unwrap();

    // Both teams come from the fallback table
    assert_eq!(h.source.searches.load(Ordering::SeqCst), 0);
    assert_eq!(h.source.stats_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.source.h2h_calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.team1.resolved_id, Some(42));
    assert_eq!(outcome.team2.resolved_id, Some(49));

    let expected = "Club Match Data (Premier League, 2024/25 Season):\n\
- Arsenal Form (Last 5): WWDWL\n\
- Chelsea Form (Last 5): LDWWD\n\
- Head-to-Head (Recent):\n  \
* Arsenal Wins: 1\n  \
* Chelsea Wins: 0\n\
- Avg Corners: 5.50 (Arsenal), 4.80 (Chelsea)";
    assert_eq!(outcome.stats_summary, expected);

    // The summary reaches the model verbatim
    assert_eq!(h.model.calls(), 1);
    let prompt = h.model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains(expected));
    assert!(prompt.contains("Arsenal"));

    match &outcome.result {
        PredictionResult::Parsed(f) => {
            assert_eq!(f.winner, "Arsenal");
            assert_eq!(f.score, "2-1");
            assert_eq!(f.corners, "10-8");
            assert_eq!(f.shots, "14-9");
            assert_eq!(f.reasoning, "Arsenal's home form is strong.");
        }
        other => panic!("expected parsed result, got {other:?}"),
    }

    let runs = h.logger.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "integration");
    assert!(runs[0].error.is_none());
}

#[tokio::test]
async fn test_searched_team_is_resolved() {
    let source = premier_league()
        .with_team(55, "Brentford")
        .with_team(56, "Brentford B")
        .with_stats(55, "DDDDD", 0, 0);
    let h = Harness::new(source, FakeModel::replying(GOOD_REPLY));
    let selection = MatchSelection::manual(39, "  brentford ", "Arsenal").unwrap();

    let outcome = h.predictor().run(&selection).await.unwrap();

    assert_eq!(h.source.searches.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.team1.resolved_id, Some(55));
    // No games played means the average is unknown, not a division by zero
    assert!(outcome.stats_summary.ends_with("Unknown (brentford), 5.50 (Arsenal)"));
}

#[tokio::test]
async fn test_unknown_team_stops_before_any_fetch() {
    let h = Harness::new(premier_league(), FakeModel::replying(GOOD_REPLY));
    let selection = MatchSelection::manual(39, "Atlantis FC", "Chelsea").unwrap();

    let err = h.predictor().run(&selection).await.unwrap_err();

    assert!(matches!(err, PredictorError::TeamNotFound { league_id: 39, .. }));
    assert_eq!(h.source.stats_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.source.h2h_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.calls(), 0);
    assert!(h.logger.runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_outage_still_predicts() {
    let h = Harness::new(FakeFootball::new().down("HTTP 503"), FakeModel::replying(GOOD_REPLY));
    let selection = MatchSelection::manual(39, "Liverpool", "Manchester United").unwrap();

    let outcome = h.predictor().run(&selection).await.unwrap();

    assert!(outcome.stats_summary.contains("- Liverpool Form (Last 5): Unknown"));
    assert!(outcome.stats_summary.contains("* Liverpool Wins: 0"));
    assert!(outcome.stats_summary.contains("Avg Corners: Unknown (Liverpool), Unknown (Manchester United)"));
    assert!(outcome.result.is_parsed());
}

#[tokio::test]
async fn test_model_failure_yields_synthetic_reply() {
    let h = Harness::new(premier_league(), FakeModel::failing("connection reset"));
    let selection = MatchSelection::manual(39, "Arsenal", "Chelsea").unwrap();

    let outcome = h.predictor().run(&selection).await.unwrap();

    assert!(outcome.engine_error.as_deref().unwrap().contains("connection reset"));
    match &outcome.result {
        PredictionResult::Parsed(f) => {
            assert_eq!(f.winner, "[Error]");
            assert_eq!(f.score, "N/A");
            assert!(f.reasoning.starts_with("Unable to generate prediction due to:"));
        }
        other => panic!("expected parsed synthetic reply, got {other:?}"),
    }

    let runs = h.logger.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].error.is_some());
}

#[tokio::test]
async fn test_unstructured_reply_is_kept_as_format_error() {
    let h = Harness::new(premier_league(), FakeModel::replying("I think Chelsea edge it."));
    let selection = MatchSelection::manual(39, "Arsenal", "Chelsea").unwrap();

    let outcome = h.predictor().run(&selection).await.unwrap();

    match &outcome.result {
        PredictionResult::FormatError { raw_text, .. } => assert_eq!(raw_text, "I think Chelsea edge it."),
        other => panic!("expected format error, got {other:?}"),
    }

    let entry = HistoryEntry::from_result("Arsenal", "Chelsea", &outcome.result);
    assert_eq!(entry.prediction, "I think Chelsea edge it.");
    assert_eq!(entry.reasoning, "Format error");
    assert!(entry.score.is_none());
}

#[test]
fn test_missing_sports_key_is_fatal() {
    let cfg = AppConfig::default();
    let err = Credentials::from_lookup(&cfg, |name| match name {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        _ => None,
    })
    .unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().contains("FOOTBALL_API_KEY"));
}
