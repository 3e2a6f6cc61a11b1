//! Engine binary for the Dominion simulation.
//!
//! Wires configuration, logging and a single game session together and
//! runs the session loop until Ctrl-C or the configured runtime limit.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `dominion-config.yaml` (defaults if absent)
//! 2. Initialize structured logging from the `logging` section
//! 3. Build the session on the default map
//! 4. Attach the log feed to the session's event bus
//! 5. Run the session loop until shutdown
//! 6. Log the result

mod error;
mod feed;
mod status_callback;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dominion_core::config::LoggingConfig;
use dominion_core::{GameConfig, GameSession, run_session};
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::status_callback::StatusCallback;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "dominion-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging or session construction
/// fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(from_file, "dominion-engine starting");
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        rivals = config.rivals.players.len(),
        rivals_enabled = config.rivals.enabled,
        tick_interval_ms = config.timers.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Build the session.
    let mut session = GameSession::from_config(&config, Utc::now())?;
    info!(
        current_player = %session.current_player_id(),
        territories = session.territories().count(),
        "Session created"
    );

    // 4. Mirror events and battles into the log.
    feed::attach(&mut session);

    // 5. Run the loop, stopping on Ctrl-C.
    let session = Arc::new(Mutex::new(session));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
        let _ = shutdown_tx.send(true);
    });

    let mut callback = StatusCallback::new();
    let summary = run_session(Arc::clone(&session), &config.runner, shutdown_rx, &mut callback).await;

    // 6. Log results.
    let guard = session.lock().await;
    for standing in status_callback::standings(&guard) {
        info!(
            player = standing.name,
            territories = standing.territories,
            agents = standing.agents,
            credits = standing.credits,
            "Final standing"
        );
    }
    info!(
        end_reason = ?summary.end_reason,
        polls = summary.polls,
        effects_fired = summary.effects_fired,
        battles = guard.battles().count(),
        reports = callback.reports(),
        "dominion-engine shutdown complete"
    );
    Ok(())
}

/// Load the configuration from [`CONFIG_PATH`], falling back to defaults.
///
/// Environment overrides apply either way. Returns whether a file was
/// read.
fn load_config() -> Result<(GameConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        return Ok((GameConfig::from_file(path)?, true));
    }
    let mut config = GameConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok((config, false))
}

/// Install the global tracing subscriber.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
