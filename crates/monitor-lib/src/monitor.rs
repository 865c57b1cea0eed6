//! Prediction pipeline shared by the CLI and the dashboard.
//!
//! Composes the token provider and the scoring client into the one
//! flow both entry points run: token, scoring call, interpretation.

use std::time::Instant;

use tracing::{info, warn};

use crate::alert::{assess, Assessment};
use crate::auth::{TokenProvider, IAM_TOKEN_URL};
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::models::{FeatureRecord, Prediction};
use crate::scoring::ScoringClient;

/// One potability check from credential to verdict.
pub struct PotabilityMonitor {
    tokens: TokenProvider,
    scoring: ScoringClient,
    api_key: String,
}

impl PotabilityMonitor {
    /// Build a monitor from scoring settings, exchanging tokens at the
    /// default IAM endpoint.
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Self::with_token_url(config, IAM_TOKEN_URL)
    }

    /// Build a monitor exchanging tokens at a specific endpoint.
    pub fn with_token_url(config: &ScoringConfig, token_url: &str) -> Result<Self> {
        Ok(Self {
            tokens: TokenProvider::with_token_url(token_url)?,
            scoring: ScoringClient::new(&config.api_endpoint)?,
            api_key: config.api_key.clone(),
        })
    }

    /// Score one feature record and interpret the result.
    ///
    /// A 401/403 from the scoring service drops the cached token so the
    /// next attempt re-authenticates. The failed call itself is not
    /// retried; re-running the check is the retry.
    pub async fn check(&self, record: &FeatureRecord) -> Result<(Prediction, Assessment)> {
        let start = Instant::now();
        let token = self.tokens.token(&self.api_key).await?;

        let prediction = match self.scoring.predict(record, &token).await {
            Ok(prediction) => prediction,
            Err(e) => {
                if e.is_auth_rejection() {
                    self.tokens.invalidate(&self.api_key);
                    warn!("Scoring service rejected the bearer token, dropped it from the cache");
                }
                return Err(e);
            }
        };

        let assessment = assess(&prediction, record);
        info!(
            label = %prediction.label,
            potable = assessment.is_potable(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Potability check completed"
        );

        Ok((prediction, assessment))
    }
}
