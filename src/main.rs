//! Vigil Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - VIGIL_CONFIG: Path of the JSON configuration file (default: vigil.json)
//! - VIGIL_HOST: Bind address (overrides `server.host`)
//! - VIGIL_PORT: Port number (overrides `server.port`)
//! - VIGIL_INTERVAL_SECS: Probing interval (overrides `interval_secs`)
//! - RUST_LOG: Log level (default: info)

use vigil::api::run_server;
use vigil::{MonitorConfig, Registry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::load()?;
    let registry = Registry::builtin();

    tracing::info!("Vigil configuration:");
    tracing::info!("  Listen: {}:{}", config.server.host, config.server.port);
    tracing::info!("  Probe interval: {} seconds", config.interval_secs);
    tracing::info!(
        "  Thresholds: warning {} ms, fatal {} ms",
        config.defaults.warning_ms,
        config.defaults.fatal_ms
    );
    tracing::info!("  Probes: {}", config.probes.len());
    for probe in &config.probes {
        tracing::info!(
            "    - {}/{} [{}] {}",
            probe.category,
            probe.name,
            probe.kind,
            probe.config.target
        );
    }
    tracing::info!("  Alerts: {}", config.alerts.len());
    for alert in &config.alerts {
        tracing::info!("    - {}", alert.kind);
    }

    println!("\n Vigil service-health board\n Version: {}\n", env!("CARGO_PKG_VERSION"));

    run_server(config, registry).await
}
