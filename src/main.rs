//! Club match predictor: entry point.
//!
//! Loads configuration, initialises structured logging, resolves the API
//! credentials and serves the prediction UI until Ctrl+C.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use club_predictor::config::{AppConfig, Credentials};
use club_predictor::engine::pipeline::Predictor;
use club_predictor::session::SessionStore;
use club_predictor::web::{self, WebState};

const BANNER: &str = r#"
   ____ _       _       ____               _ _      _
  / ___| |_   _| |__   |  _ \ _ __ ___  __| (_) ___| |_ ___  _ __
 | |   | | | | | '_ \  | |_) | '__/ _ \/ _` | |/ __| __/ _ \| '__|
 | |___| | |_| | |_) | |  __/| | |  __/ (_| | | (__| || (_) | |
  \____|_|\__,_|_.__/  |_|   |_|  \___|\__,_|_|\___|\__\___/|_|

  AI club football match predictor
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("PREDICTOR_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    println!("{BANNER}");
    if !Path::new(&config_path).exists() {
        info!(config = %config_path, "Config file not found, using built-in defaults");
    }
    info!(
        config = %config_path,
        season = cfg.sports_api.season,
        model = %cfg.llm.model,
        "Club predictor starting up"
    );

    // Missing keys stop startup before anything is served
    let creds = match Credentials::from_env(&cfg) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Cannot start without API credentials");
            return Err(e.into());
        }
    };

    let predictor = Predictor::from_config(&cfg, creds)?;
    let sessions = SessionStore::with_idle_timeout(cfg.server.session_idle());
    let state = Arc::new(WebState::new(predictor).with_sessions(sessions));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("Invalid server address {}:{}", cfg.server.host, cfg.server.port))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received.");
    };

    web::serve(addr, state, shutdown).await?;

    info!("Club predictor shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("club_predictor=info"));

    let json_logging = std::env::var("PREDICTOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
