//! Object storage uploads over the COS HTTP interface.
//!
//! One PUT per upload, authorized with an IAM bearer token. No
//! chunking, no multipart, no retry.

use std::time::Duration;

use tracing::info;
use url::Url;

use crate::auth::Token;
use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Client for one object storage bucket.
#[derive(Debug)]
pub struct ObjectStore {
    http: reqwest::Client,
    endpoint: Url,
    bucket: String,
    service_instance_id: String,
}

impl ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Error::configuration(format!("invalid storage endpoint: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            bucket: config.bucket.clone(),
            service_instance_id: config.service_instance_id.clone(),
        })
    }

    /// Upload one object under the given key.
    pub async fn put_object(&self, key: &str, bytes: Vec<u8>, token: &Token) -> Result<()> {
        let url = self.object_url(key)?;
        let size = bytes.len();

        let response = self
            .http
            .put(url)
            .bearer_auth(token.value())
            .header("ibm-service-instance-id", &self.service_instance_id)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::api(format!("storage endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api_status(
                status.as_u16(),
                format!("upload of '{key}' failed: {}", body.trim()),
            ));
        }

        info!(bucket = %self.bucket, key = %key, bytes = size, "Uploaded object");
        Ok(())
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration("storage endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.bucket)
            .push(key);
        Ok(url)
    }
}
