//! HTTP clients against local stand-ins for API-Football and the
//! chat completions endpoint.

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;

use club_predictor::config::{LlmConfig, SportsApiConfig};
use club_predictor::data::football::ApiFootballClient;
use club_predictor::data::SportsDataSource;
use club_predictor::llm::openai::OpenAiClient;
use club_predictor::llm::ChatModel;

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn authorised(headers: &HeaderMap) -> bool {
    headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok()) == Some("test-key")
        && headers.get("x-rapidapi-host").and_then(|v| v.to_str().ok()) == Some("football.test")
}

fn envelope(response: Value) -> Json<Value> {
    Json(json!({ "errors": [], "results": 1, "response": response }))
}

async fn teams(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    if !authorised(&headers) {
        return Err(StatusCode::FORBIDDEN);
    }
    let hits = match q.get("search").map(String::as_str) {
        Some("brentford") => json!([
            { "team": { "id": 55, "name": "Brentford" }, "venue": { "name": "Gtech" } },
            { "team": { "id": 9001, "name": "Brentford W" } }
        ]),
        _ => json!([]),
    };
    Ok(envelope(hits))
}

async fn statistics(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    if !authorised(&headers) {
        return Err(StatusCode::FORBIDDEN);
    }
    let key = (
        q.get("team").map(String::as_str),
        q.get("league").map(String::as_str),
        q.get("season").map(String::as_str),
    );
    match key {
        (Some("42"), Some("39"), Some("2024")) => Ok(envelope(json!({
            "form": "WWDWL",
            "fixtures": {
                "played": { "home": 5, "away": 5, "total": 10 },
                "corners": { "total": 55 }
            }
        }))),
        (Some("666"), _, _) => Ok(Json(json!({
            "errors": { "team": "The Team field must contain an integer." },
            "results": 0,
            "response": []
        }))),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn head_to_head(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    if !authorised(&headers) {
        return Err(StatusCode::FORBIDDEN);
    }
    if q.get("h2h").map(String::as_str) != Some("42-49") {
        return Ok(envelope(json!([])));
    }
    Ok(envelope(json!([
        { "teams": {
            "home": { "id": 42, "name": "Arsenal", "winner": true },
            "away": { "id": 49, "name": "Chelsea", "winner": false } } },
        { "teams": {
            "home": { "id": 49, "name": "Chelsea", "winner": null },
            "away": { "id": 42, "name": "Arsenal", "winner": null } } }
    ])))
}

async fn football_client() -> ApiFootballClient {
    let app = Router::new()
        .route("/v3/teams", get(teams))
        .route("/v3/teams/statistics", get(statistics))
        .route("/v3/fixtures/headtohead", get(head_to_head));
    let addr = spawn(app).await;

    let cfg = SportsApiConfig {
        base_url: format!("http://{addr}/v3/"),
        host: "football.test".into(),
        timeout_secs: 5,
        ..SportsApiConfig::default()
    };
    ApiFootballClient::new(&cfg, &SecretString::new("test-key".into())).unwrap()
}

#[tokio::test]
async fn test_team_search_over_http() {
    let client = football_client().await;

    let hits = client.search_teams("brentford").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, 55);
    assert_eq!(hits[0].name, "Brentford");

    assert!(client.search_teams("atlantis fc").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_statistics_over_http() {
    let client = football_client().await;

    let stats = client.team_statistics(42, 39, 2024).await.unwrap().unwrap();
    assert_eq!(stats.form.as_deref(), Some("WWDWL"));
    assert_eq!(stats.matches_played, Some(10));
    assert_eq!(stats.total_corners, Some(55));

    // Non-2xx and error envelopes both surface as errors
    assert!(client.team_statistics(7, 39, 2024).await.is_err());
    assert!(client.team_statistics(666, 39, 2024).await.is_err());
}

#[tokio::test]
async fn test_head_to_head_over_http() {
    let client = football_client().await;

    let fixtures = client.head_to_head(42, 49).await.unwrap();
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[0].home.id, Some(42));
    assert!(fixtures[0].home.won());
    assert_eq!(fixtures[1].home.winner, None);
    assert!(!fixtures[1].away.won());
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let app = Router::new().route("/v3/teams", get(teams));
    let addr = spawn(app).await;
    let cfg = SportsApiConfig {
        base_url: format!("http://{addr}/v3"),
        host: "football.test".into(),
        ..SportsApiConfig::default()
    };
    let client = ApiFootballClient::new(&cfg, &SecretString::new("wrong".into())).unwrap();

    assert!(client.search_teams("brentford").await.is_err());
}

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    if body["model"] != "gpt-test" || !prompt.contains("Arsenal") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({
        "choices": [{ "message": { "role": "assistant",
            "content": "Prediction: Arsenal\nScore: 2-1\nCorners: 10-8\nShots: 14-9\nReasoning: Form." } }],
        "usage": { "total_tokens": 120 }
    })))
}

#[tokio::test]
async fn test_chat_completion_over_http() {
    let addr = spawn(Router::new().route("/v1/chat/completions", post(completions))).await;
    let cfg = LlmConfig {
        endpoint: format!("http://{addr}/v1/chat/completions"),
        model: "gpt-test".into(),
        ..LlmConfig::default()
    };

    let client = OpenAiClient::new(&cfg, SecretString::new("sk-test".into())).unwrap();
    let reply = client.complete("Who wins, Arsenal or Chelsea?").await.unwrap();
    assert!(reply.starts_with("Prediction: Arsenal"));
    assert_eq!(client.total_calls(), 1);
    assert_eq!(client.total_tokens(), 120);

    let rejected = OpenAiClient::new(&cfg, SecretString::new("sk-wrong".into())).unwrap();
    let err = rejected.complete("Arsenal?").await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
