//! Error taxonomy for the prediction pipeline.
//!
//! Only `CredentialMissing` is fatal (startup). Everything else is raised
//! per request and either aborts that request (`TeamNotFound`,
//! `InvalidSelection`) or is converted into a degraded value at its call
//! site before it can reach the handler.

use thiserror::Error;

use crate::llm::parser::ParseError;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("missing credential: environment variable {var} is not set")]
    CredentialMissing { var: String },

    #[error("team not found: '{name}' (league {league_id})")]
    TeamNotFound { name: String, league_id: u32 },

    #[error("{service} unavailable: {reason}")]
    RemoteUnavailable { service: &'static str, reason: String },

    #[error("prediction failed: {0}")]
    PredictionFailure(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PredictorError {
    /// True for errors that should stop the process rather than a request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PredictorError::CredentialMissing { .. })
    }
}
