//! Dashboard configuration

use anyhow::Result;
use serde::Deserialize;

/// Dashboard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8501
}

impl DashboardConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("DASHBOARD"))
            .build()?;

        Ok(config
            .try_deserialize()
            .unwrap_or_else(|_| DashboardConfig {
                port: default_port(),
            }))
    }
}
