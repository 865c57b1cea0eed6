//! Watson ML scoring client.
//!
//! Builds the fields/values envelope the deployed model expects, makes
//! one authenticated POST per prediction, and turns malformed success
//! responses into shape errors that keep the raw body.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::Token;
use crate::error::{Error, Result};
use crate::models::{FeatureRecord, Prediction};

#[derive(Debug, Serialize)]
struct ScoringRequest<'a> {
    input_data: Vec<InputData<'a>>,
}

#[derive(Debug, Serialize)]
struct InputData<'a> {
    fields: Vec<&'a str>,
    values: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct ScoringResponse {
    predictions: Vec<PredictionOutput>,
}

#[derive(Debug, Deserialize)]
struct PredictionOutput {
    values: Vec<Vec<serde_json::Value>>,
}

/// Client for one deployed scoring endpoint.
#[derive(Debug)]
pub struct ScoringClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ScoringClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::configuration(format!("invalid scoring endpoint: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Score one feature record. The record's field names and values
    /// are sent as parallel arrays, index for index.
    pub async fn predict(&self, record: &FeatureRecord, token: &Token) -> Result<Prediction> {
        let request = ScoringRequest {
            input_data: vec![InputData {
                fields: record.field_names(),
                values: vec![record.value_row()],
            }],
        };

        debug!(
            fields = record.len(),
            "Submitting feature record for scoring"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(token.value())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(format!("scoring endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api_status(
                status.as_u16(),
                format!("scoring request failed: {}", body.trim()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::api(format!("failed to read scoring response: {e}")))?;

        let envelope: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::response_shape(format!("response is not JSON: {e}"), &body))?;
        let parsed: ScoringResponse = serde_json::from_value(envelope.clone())
            .map_err(|e| Error::response_shape(format!("unexpected response: {e}"), &body))?;

        let label = parsed
            .predictions
            .first()
            .ok_or_else(|| Error::response_shape("empty predictions list", &body))?
            .values
            .first()
            .ok_or_else(|| Error::response_shape("prediction has no output rows", &body))?
            .first()
            .cloned()
            .ok_or_else(|| Error::response_shape("prediction row is empty", &body))?;

        debug!(label = %label, "Received prediction");

        Ok(Prediction {
            label,
            response: envelope,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }
}
