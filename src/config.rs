//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at startup into [`Credentials`].

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::PredictorError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sports_api: SportsApiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub run_log: RunLogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Sessions untouched for this long are dropped with their history.
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8501, session_idle_secs: 3600 }
    }
}

impl ServerConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SportsApiConfig {
    pub base_url: String,
    /// Value of the `X-RapidAPI-Host` header.
    pub host: String,
    pub api_key_env: String,
    pub season: u16,
    pub timeout_secs: u64,
}

impl Default for SportsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-football-v1.p.rapidapi.com/v3".into(),
            host: "api-football-v1.p.rapidapi.com".into(),
            api_key_env: "FOOTBALL_API_KEY".into(),
            season: 2024,
            timeout_secs: 15,
        }
    }
}

impl SportsApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunLogConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub run_name: String,
    pub timeout_secs: u64,
}

impl Default for RunLogConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.smith.langchain.com/runs".into(),
            api_key_env: "LANGSMITH_API_KEY".into(),
            run_name: "club_football_prediction".into(),
            timeout_secs: 10,
        }
    }
}

impl RunLogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use the built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The three secrets the service needs.
#[derive(Debug)]
pub struct Credentials {
    pub sports_api_key: SecretString,
    pub llm_api_key: SecretString,
    /// Absent key turns run logging into a no-op.
    pub run_log_api_key: Option<SecretString>,
}

impl Credentials {
    /// Resolve from the process environment.
    pub fn from_env(cfg: &AppConfig) -> Result<Self, PredictorError> {
        Self::from_lookup(cfg, |name| std::env::var(name).ok())
    }

    /// Resolve through an arbitrary lookup. Empty values count as missing.
    pub fn from_lookup<F>(cfg: &AppConfig, lookup: F) -> Result<Self, PredictorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name)
                .map(SecretString::new)
                .ok_or_else(|| PredictorError::CredentialMissing { var: name.to_string() })
        };

        Ok(Self {
            sports_api_key: require(&cfg.sports_api.api_key_env)?,
            llm_api_key: require(&cfg.llm.api_key_env)?,
            run_log_api_key: get(&cfg.run_log.api_key_env).map(SecretString::new),
        })
    }
}
