//! Best-effort run logging (LangSmith-compatible `POST /runs`).
//!
//! One record per prediction. Recording never blocks or fails the
//! caller: the HTTP post runs on a detached task and errors are logged.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::RunLogConfig;
use crate::types::PredictionRequest;

/// One model invocation, inputs and output.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub name: String,
    pub run_type: &'static str,
    pub inputs: serde_json::Value,
    pub outputs: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(
        name: &str,
        request: &PredictionRequest,
        reply: &str,
        error: Option<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            run_type: "llm",
            inputs: json!({
                "team1": request.team1,
                "team2": request.team2,
                "stats": request.stats_summary,
            }),
            outputs: json!({ "prediction": reply }),
            error,
            start_time,
            end_time: Utc::now(),
        }
    }
}

/// Sink for run records. Implementations must not block or panic.
pub trait RunLogger: Send + Sync {
    fn record(&self, run: RunRecord);

    /// Name attached to every run.
    fn run_name(&self) -> &str;
}

/// Used when no logging key is configured.
pub struct NoopRunLogger {
    run_name: String,
}

impl NoopRunLogger {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self { run_name: run_name.into() }
    }
}

impl RunLogger for NoopRunLogger {
    fn record(&self, run: RunRecord) {
        debug!(run_id = %run.id, "Run logging disabled, dropping record");
    }

    fn run_name(&self) -> &str {
        &self.run_name
    }
}

pub struct HttpRunLogger {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    run_name: String,
}

impl HttpRunLogger {
    pub fn new(cfg: &RunLogConfig, api_key: SecretString) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .context("Failed to build run-log HTTP client")?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key,
            run_name: cfg.run_name.clone(),
        })
    }
}

impl RunLogger for HttpRunLogger {
    fn record(&self, run: RunRecord) {
        let request = self.http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret().as_str())
            .json(&run);
        let run_id = run.id;

        // Outside a runtime (e.g. sync tests) the record is dropped
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(%run_id, "No async runtime, run record dropped");
            return;
        };

        handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(%run_id, "Run record posted");
                }
                Ok(resp) => {
                    warn!(%run_id, status = %resp.status(), "Run log rejected record");
                }
                Err(e) => {
                    warn!(%run_id, error = %e, "Failed to post run record");
                }
            }
        });
    }

    fn run_name(&self) -> &str {
        &self.run_name
    }
}

/// Pick the HTTP logger when a key is present, otherwise the no-op.
pub fn from_config(cfg: &RunLogConfig, api_key: Option<SecretString>) -> Result<Box<dyn RunLogger>> {
    Ok(match api_key {
        Some(key) => Box::new(HttpRunLogger::new(cfg, key)?),
        None => {
            warn!(env = %cfg.api_key_env, "Run logging key not set, run logging disabled");
            Box::new(NoopRunLogger::new(cfg.run_name.clone()))
        }
    })
}
