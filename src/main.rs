//! Pankha IPMI bridge entry point: CLI/env configuration, logging, async runtime.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pankha_ipmi_bridge::app::cli::Args;
use pankha_ipmi_bridge::app::logging::init_tracing;
use pankha_ipmi_bridge::bridge::snapshot::run_snapshot;
use pankha_ipmi_bridge::bridge::runner::{self, ipmi_adapter};
use pankha_ipmi_bridge::config::loader::{load_config, startup_hint};
use pankha_ipmi_bridge::mqtt::topics::Topics;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            if let Some(hint) = startup_hint(&e) {
                eprintln!("{}", hint);
            }
            std::process::exit(1);
        }
    };

    if args.show_config {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    if args.test {
        info!("Running in test mode against {}", config.ipmi.host);
        let topics = Topics::new(&config.ipmi.host, &config.bridge.discovery_prefix);
        let report = run_snapshot(&ipmi_adapter(&config), &topics).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!(
        "Pankha IPMI bridge v{} starting for BMC {}",
        env!("CARGO_PKG_VERSION"),
        config.ipmi.host
    );
    info!(
        "Poll interval {}s, settle delay {}s, broker {}:{}",
        config.bridge.poll_interval_secs,
        config.bridge.settle_delay_secs,
        config.mqtt.server,
        config.mqtt.port
    );

    runner::run(config).await
}
