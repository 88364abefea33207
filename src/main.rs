//! meterwatch - meter balance exporter
//!
//! Polls the remaining balance of a prepaid meter and ships it as a metric
//! point to an Alibaba Cloud SLS metricstore.
//!
//! # Usage
//! ```sh
//! YDAPP_OPENID=... YDAPP_ROOM_ID=... cargo run
//! cargo run -- --once
//! ```
//!
//! # Environment Variables
//! - `YDAPP_OPENID`, `YDAPP_ROOM_ID` - portal identity and meter (required)
//! - `ALIBABA_CLOUD_ACCESS_KEY_ID`, `ALIBABA_CLOUD_ACCESS_KEY_SECRET` - credentials (required)
//! - `ALIBABA_CLOUD_SLS_ENDPOINT`, `ALIBABA_CLOUD_SLS_PROJECT`, `ALIBABA_CLOUD_SLS_STORE` - target (required)
//! - `POLL_INTERVAL_SECS` - delay between cycles (default: 30)

use anyhow::Result;
use clap::Parser;
use meterwatch::application::system::Application;
use meterwatch::config::Config;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Meter balance exporter", long_about = None)]
struct Cli {
    /// Run a single poll cycle, flush, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("meterwatch {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: room={}, sls={:?}, interval={:?}",
        config.ydapp.room_id, config.sls, config.poll.interval
    );

    let app = Application::build(config).await?;

    if cli.once {
        let reading = app.run_once().await?;
        info!(
            "Balance for room {} at {}: {}",
            reading.room_id,
            reading.observed_at.to_rfc3339(),
            reading.balance
        );
        return Ok(());
    }

    info!("Running. Press Ctrl+C to shutdown.");
    if let Err(e) = app.run().await {
        error!("Shutdown finished with errors: {:#}", e);
    }

    Ok(())
}
