//! API route handlers.
//!
//! All endpoints return JSON. Shared state is `Arc<WebState>`; each
//! browser is tied to its `SessionContext` through a `session_id` cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::pipeline::{PredictionOutcome, Predictor};
use crate::error::PredictorError;
use crate::leagues::LEAGUES;
use crate::session::{SessionStore, RECENT_LIMIT};
use crate::types::{HistoryEntry, MatchSelection};

pub const SESSION_COOKIE: &str = "session_id";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct WebState {
    pub predictor: Predictor,
    pub sessions: SessionStore,
}

impl WebState {
    pub fn new(predictor: Predictor) -> Self {
        Self { predictor, sessions: SessionStore::new() }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }
}

pub type AppState = Arc<WebState>;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// `session_id` from the `Cookie` header(s), if well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// No `Max-Age`: the cookie, and with it the history, ends with the browser session.
fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

async fn open_session(state: &WebState, headers: &HeaderMap) -> (Uuid, [(header::HeaderName, String); 1]) {
    let id = state.sessions.ensure(session_from_headers(headers)).await;
    (id, [(header::SET_COOKIE, session_cookie(id))])
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Either a fixture label from the picker or two manual names.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictForm {
    pub league_id: u32,
    #[serde(default)]
    pub fixture: Option<String>,
    #[serde(default)]
    pub team1: Option<String>,
    #[serde(default)]
    pub team2: Option<String>,
}

impl PredictForm {
    pub fn into_selection(self) -> Result<MatchSelection, PredictorError> {
        match self.fixture.filter(|f| !f.trim().is_empty()) {
            Some(label) => MatchSelection::from_fixture(self.league_id, &label),
            None => MatchSelection::manual(
                self.league_id,
                self.team1.as_deref().unwrap_or_default(),
                self.team2.as_deref().unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueView {
    pub id: u32,
    pub name: &'static str,
    pub fixtures: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub recent: Vec<HistoryEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub outcome: PredictionOutcome,
    pub history: HistoryResponse,
}

/// Maps pipeline errors to an HTTP status and a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError(pub PredictorError);

impl From<PredictorError> for ApiError {
    fn from(e: PredictorError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PredictorError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            PredictorError::TeamNotFound { .. } => StatusCode::NOT_FOUND,
            PredictorError::RemoteUnavailable { .. }
            | PredictorError::PredictionFailure(_)
            | PredictorError::Parse(_) => StatusCode::BAD_GATEWAY,
            PredictorError::CredentialMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/leagues
pub async fn get_leagues() -> Json<Vec<LeagueView>> {
    Json(
        LEAGUES
            .iter()
            .map(|l| LeagueView { id: l.id, name: l.name, fixtures: l.fixture_labels() })
            .collect(),
    )
}

/// POST /api/predict
pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<PredictForm>,
) -> Result<impl IntoResponse, ApiError> {
    let (session, cookie) = open_session(&state, &headers).await;
    let selection = form.into_selection()?;

    let outcome = state.predictor.run(&selection).await?;
    let entry = HistoryEntry::from_result(&outcome.team1.name, &outcome.team2.name, &outcome.result);

    let history = state
        .sessions
        .with_session(session, |ctx| {
            ctx.record(entry);
            history_of(ctx)
        })
        .await;

    info!(
        session = %session,
        team1 = %outcome.team1.name,
        team2 = %outcome.team2.name,
        parsed = outcome.result.is_parsed(),
        "Prediction served"
    );

    Ok((cookie, Json(PredictResponse { outcome, history })))
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (session, cookie) = open_session(&state, &headers).await;
    let history = state.sessions.with_session(session, |ctx| history_of(ctx)).await;
    (cookie, Json(history))
}

/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (session, cookie) = open_session(&state, &headers).await;
    let history = state
        .sessions
        .with_session(session, |ctx| {
            ctx.clear_history();
            history_of(ctx)
        })
        .await;
    (cookie, Json(history))
}

/// POST /api/reset
pub async fn reset_form(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (session, cookie) = open_session(&state, &headers).await;
    let form_reset = state.sessions.with_session(session, |ctx| ctx.reset_form()).await;
    (cookie, Json(json!({ "form_reset": form_reset })))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

fn history_of(ctx: &crate::session::SessionContext) -> HistoryResponse {
    HistoryResponse {
        recent: ctx.recent(RECENT_LIMIT).to_vec(),
        total: ctx.history().len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
