//! Water Quality Monitor dashboard
//!
//! This binary serves an interactive potability prediction page
//! backed by the hosted scoring model, plus health and metrics
//! endpoints.

use anyhow::Result;
use monitor_lib::{MonitorMetrics, PotabilityMonitor, ScoringConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting wqm-dashboard");

    // Load configuration
    let config = config::DashboardConfig::load()?;
    let scoring = ScoringConfig::load()?;
    info!(port = config.port, "Dashboard configured");

    // Initialize metrics
    let metrics = MonitorMetrics::new();

    // Create shared application state
    let monitor = PotabilityMonitor::new(&scoring)?;
    let state = Arc::new(app::AppState::new(monitor, metrics));

    app::serve(config.port, state).await
}
