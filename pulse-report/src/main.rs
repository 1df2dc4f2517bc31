//! Pulse Report - One-shot composite market report generator.
//!
//! Loads configuration, runs a single report generation, and writes the
//! composite JSON document to stdout.

use anyhow::Result;
use pulse_common::config::Config;
use pulse_common::logging::init_logging;
use pulse_report::ReportOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Pulse Report v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = ReportOrchestrator::from_config(&config);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    let document = orchestrator.generate().await;
    println!("{}", serde_json::to_string_pretty(&document.into_value())?);

    Ok(())
}
