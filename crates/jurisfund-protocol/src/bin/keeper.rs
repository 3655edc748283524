//! # jurisfund-keeper
//!
//! Automation caller for the escrow registry. Loads the protocol config and
//! a genesis document, then ticks the upkeep loop until ctrl-c.
//!
//! Environment:
//! - `JURISFUND_CONFIG`: path to a JSON `ProtocolConfig` (defaults otherwise)
//! - `JURISFUND_GENESIS`: path to a JSON genesis document (balances and
//!   escrows to deploy); an empty ledger otherwise
//! - `JURISFUND_KEEPER_TICK_SECS`: seconds between checks (default 60)
//! - `JURISFUND_LOG_FORMAT=json`: JSON log lines
//! - `RUST_LOG`: log filter (default `info`)

use std::time::Duration;

use chrono::Utc;
use jurisfund_protocol::{Genesis, JurisFund, Sequencer, run_keeper, sequencer};
use jurisfund_types::{ProtocolConfig, constants};

const DEFAULT_TICK_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = match std::env::var("JURISFUND_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "Loading configuration");
            ProtocolConfig::from_json_file(&path).map_err(|e| {
                tracing::error!("Configuration failed: {e}");
                e
            })?
        }
        Err(_) => {
            tracing::warn!("JURISFUND_CONFIG not set, using defaults");
            ProtocolConfig::default()
        }
    };
    let genesis = match std::env::var("JURISFUND_GENESIS") {
        Ok(path) => {
            tracing::info!(%path, "Loading genesis");
            Genesis::from_json_file(&path).map_err(|e| {
                tracing::error!("Genesis failed: {e}");
                e
            })?
        }
        Err(_) => {
            tracing::warn!("JURISFUND_GENESIS not set, starting with an empty ledger");
            Genesis::default()
        }
    };
    let tick_secs: u64 = std::env::var("JURISFUND_KEEPER_TICK_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&s| s > 0)
        .unwrap_or(DEFAULT_TICK_SECS);

    let mut fund = JurisFund::with_start(config, genesis.start.unwrap_or_else(Utc::now))?;
    let deployed = genesis.apply(&mut fund)?;
    tracing::info!(
        version = constants::VERSION,
        treasury = %fund.treasury(),
        escrows = deployed.len(),
        tick_secs,
        "{} keeper started",
        constants::PROTOCOL_NAME
    );
    let (handle, task) = Sequencer::spawn(fund, sequencer::DEFAULT_QUEUE_DEPTH);

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    };
    let stats = run_keeper(handle, Duration::from_secs(tick_secs), shutdown).await;

    let fund = task.await?;
    tracing::info!(
        ticks = stats.ticks,
        runs = stats.runs,
        failures = stats.failures,
        settled = stats.settled.len(),
        events = fund.events().len(),
        "Keeper stopped"
    );
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("JURISFUND_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
