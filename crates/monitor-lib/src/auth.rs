//! IAM token exchange with a read-through cache.
//!
//! A provider instance exchanges long-lived API keys for short-lived
//! bearer tokens and keeps one live token per credential until close
//! to its expiry. No retries; a failed exchange surfaces immediately.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default IBM Cloud identity endpoint.
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are replaced this long before their reported expiry so one
/// is never handed out at the edge of its window.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

type Clock = Box<dyn Fn() -> Instant + Send + Sync>;

/// Short-lived bearer credential with its validity deadline.
#[derive(Debug, Clone)]
pub struct Token {
    value: String,
    expires_at: Instant,
}

impl Token {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True once the deadline, less the refresh margin, has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN >= self.expires_at
    }
}

#[cfg(test)]
impl Token {
    pub(crate) fn for_tests(value: &str, expires_at: Instant) -> Self {
        Self {
            value: value.to_string(),
            expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Exchanges API keys for bearer tokens against the IAM endpoint.
///
/// The cache is keyed by credential, guarded by a mutex that is never
/// held across an await point. Time is read through an injected clock
/// so expiry can be driven deterministically in tests.
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: String,
    cache: Mutex<HashMap<String, Token>>,
    now: Clock,
}

impl TokenProvider {
    /// Create a provider against the default IAM endpoint.
    pub fn new() -> Result<Self> {
        Self::with_token_url(IAM_TOKEN_URL)
    }

    /// Create a provider against a specific token endpoint.
    pub fn with_token_url(token_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token_url: token_url.into(),
            cache: Mutex::new(HashMap::new()),
            now: Box::new(Instant::now),
        })
    }

    /// Replace the clock used for expiry decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> Instant + Send + Sync + 'static) -> Self {
        self.now = Box::new(clock);
        self
    }

    /// Return a valid bearer token for the credential, from cache when
    /// one is still inside its validity window.
    pub async fn token(&self, api_key: &str) -> Result<Token> {
        if api_key.trim().is_empty() {
            return Err(Error::configuration(
                "cannot request a token with a blank API key",
            ));
        }

        let now = (self.now)();
        {
            let cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(token) = cache.get(api_key) {
                if !token.is_expired(now) {
                    debug!("Using cached IAM token");
                    return Ok(token.clone());
                }
            }
        }

        let token = self.fetch_token(api_key).await?;

        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.insert(api_key.to_string(), token.clone());
        Ok(token)
    }

    /// Drop the cached token for the credential so the next request
    /// performs a fresh exchange.
    pub fn invalidate(&self, api_key: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if cache.remove(api_key).is_some() {
            debug!("Invalidated cached IAM token");
        }
    }

    async fn fetch_token(&self, api_key: &str) -> Result<Token> {
        let params = [("grant_type", IAM_GRANT_TYPE), ("apikey", api_key)];

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::auth(format!("identity endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth_status(
                status.as_u16(),
                format!("token request rejected: {}", body.trim()),
            ));
        }

        let parsed: IamTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("unexpected token response: {e}")))?;

        info!(
            expires_in_secs = parsed.expires_in,
            "Obtained new IAM access token"
        );

        Ok(Token {
            value: parsed.access_token,
            expires_at: (self.now)() + Duration::from_secs(parsed.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::Arc;

    const TOKEN_BODY: &str = r#"{"access_token":"tok-123","expires_in":3600}"#;

    #[tokio::test]
    async fn test_token_exchange_sends_iam_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), IAM_GRANT_TYPE.into()),
                Matcher::UrlEncoded("apikey".into(), "key-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOKEN_BODY)
            .expect(1)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        let token = provider.token("key-1").await.unwrap();

        assert_eq!(token.value(), "tok-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .expect(1)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        let first = provider.token("key-1").await.unwrap();
        let second = provider.token("key-1").await.unwrap();

        assert_eq!(first.value(), second.value());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refetched() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .expect(2)
            .create_async()
            .await;

        let fake_now = Arc::new(Mutex::new(Instant::now()));
        let clock_now = Arc::clone(&fake_now);
        let provider = TokenProvider::with_token_url(server.url())
            .unwrap()
            .with_clock(move || *clock_now.lock().unwrap());

        provider.token("key-1").await.unwrap();

        // Jump past the reported expiry.
        *fake_now.lock().unwrap() += Duration::from_secs(3601);
        provider.token("key-1").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_exchange() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .expect(2)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        provider.token("key-1").await.unwrap();
        provider.invalidate("key-1");
        provider.token("key-1").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_key_fails_before_any_network_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .expect(0)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        let err = provider.token("   ").await.unwrap_err();

        assert!(matches!(err, Error::Configuration { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_credential_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(400)
            .with_body(r#"{"errorMessage":"Provided API key could not be found"}"#)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        let err = provider.token("bad-key").await.unwrap_err();

        assert!(matches!(err, Error::Auth { .. }));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("could not be found"));
    }

    #[tokio::test]
    async fn test_missing_expires_in_defaults_to_an_hour() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"access_token":"tok-9"}"#)
            .expect(1)
            .create_async()
            .await;

        let start = Instant::now();
        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        let token = provider.token("key-1").await.unwrap();

        assert!(!token.is_expired(start));
        assert!(token.is_expired(start + Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn test_tokens_cached_per_credential() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .expect(2)
            .create_async()
            .await;

        let provider = TokenProvider::with_token_url(server.url()).unwrap();
        provider.token("key-1").await.unwrap();
        provider.token("key-2").await.unwrap();
        provider.token("key-1").await.unwrap();
        provider.token("key-2").await.unwrap();

        mock.assert_async().await;
    }
}
