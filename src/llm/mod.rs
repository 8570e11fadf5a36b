//! LLM integration for match prediction.
//!
//! Defines the `ChatModel` trait, the OpenAI implementation, the prompt
//! template, the reply parser and run logging. `PredictionEngine` ties
//! them together for a single prediction call.

pub mod openai;
pub mod parser;
pub mod prompt;
pub mod runlog;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::PredictorError;
use crate::types::PredictionRequest;
use runlog::{RunLogger, RunRecord};

/// Abstraction over a chat-completion model: prompt in, free text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

/// Reply handed to the parser. `error` is set when `text` is synthetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub text: String,
    pub error: Option<String>,
}

/// Error-shaped reply carrying all five markers, so it still parses.
pub fn synthetic_error_reply(reason: &str) -> String {
    format!(
        "Prediction: [Error]\nScore: N/A\nCorners: N/A\nShots: N/A\nReasoning: Unable to generate prediction due to: {reason}"
    )
}

pub struct PredictionEngine {
    model: Arc<dyn ChatModel>,
    run_logger: Arc<dyn RunLogger>,
}

impl PredictionEngine {
    pub fn new(model: Arc<dyn ChatModel>, run_logger: Arc<dyn RunLogger>) -> Self {
        Self { model, run_logger }
    }

    /// One model call, never an error. Emits one run record either way.
    pub async fn predict(&self, request: &PredictionRequest) -> EngineReply {
        let prompt = prompt::build_prompt(request);
        let started = Utc::now();

        let reply = match self.model.complete(&prompt).await {
            Ok(text) => {
                info!(
                    model = %self.model.model_name(),
                    team1 = %request.team1,
                    team2 = %request.team2,
                    "Prediction generated"
                );
                EngineReply { text, error: None }
            }
            Err(e) => {
                let reason = format!("{e:#}");
                let failure = PredictorError::PredictionFailure(reason.clone());
                warn!(model = %self.model.model_name(), error = %failure, "Prediction call failed");
                EngineReply { text: synthetic_error_reply(&reason), error: Some(failure.to_string()) }
            }
        };

        self.run_logger.record(RunRecord::new(
            self.run_logger.run_name(),
            request,
            &reply.text,
            reply.error.clone(),
            started,
        ));

        reply
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
