//! Environment-backed configuration for the scoring and storage services.
//!
//! Settings are read once at startup. A missing or blank value for the
//! active entry point is a configuration error raised before any
//! network call.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default IBM Cloud Object Storage endpoint (us-south region).
pub const DEFAULT_COS_ENDPOINT: &str = "https://s3.us-south.cloud-object-storage.appdomain.cloud";

/// Settings for the Watson ML scoring service.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// IBM Cloud API key, from WML_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Full scoring endpoint URL, from WML_API_ENDPOINT
    #[serde(default)]
    pub api_endpoint: String,
}

impl ScoringConfig {
    /// Load scoring settings from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix("WML"))
    }

    fn load_from(source: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| Error::configuration(format!("failed to read environment: {e}")))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::configuration(format!("invalid scoring settings: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        required("WML_API_KEY", &self.api_key)?;
        required("WML_API_ENDPOINT", &self.api_endpoint)?;
        Ok(())
    }
}

/// Settings for the object storage bucket used by ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// IBM Cloud API key for object storage, from COS_API_KEY_ID
    #[serde(default)]
    pub api_key_id: String,

    /// Service instance the bucket belongs to, from COS_SERVICE_INSTANCE_ID
    #[serde(default)]
    pub service_instance_id: String,

    /// Target bucket, from BUCKET_NAME
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Regional endpoint, from COS_ENDPOINT
    #[serde(default = "default_cos_endpoint")]
    pub endpoint: String,
}

fn default_bucket() -> String {
    std::env::var("BUCKET_NAME").unwrap_or_default()
}

fn default_cos_endpoint() -> String {
    DEFAULT_COS_ENDPOINT.to_string()
}

impl StorageConfig {
    /// Load storage settings from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix("COS"))
    }

    fn load_from(source: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| Error::configuration(format!("failed to read environment: {e}")))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::configuration(format!("invalid storage settings: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        required("COS_API_KEY_ID", &self.api_key_id)?;
        required("COS_SERVICE_INSTANCE_ID", &self.service_instance_id)?;
        required("BUCKET_NAME", &self.bucket)?;
        required("COS_ENDPOINT", &self.endpoint)?;
        Ok(())
    }
}

fn required(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::configuration(format!("{name} is not set")));
    }
    Ok(())
}
