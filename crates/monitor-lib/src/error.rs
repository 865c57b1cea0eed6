//! Error types for the water quality monitor.
//!
//! Every failure in the pipeline maps to one of four kinds so the
//! entry points can render them without inspecting source errors.

/// The main error type for all monitor operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is missing or blank. Raised before any
    /// network call is attempted.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is missing and where it is read from.
        message: String,
    },

    /// The identity endpoint rejected the credential or was unreachable.
    #[error("Authentication error{}: {}", status_suffix(.status), .message)]
    Auth {
        /// HTTP status from the identity endpoint, if one was received.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The scoring or storage endpoint returned a non-success status
    /// or was unreachable.
    #[error("API error{}: {}", status_suffix(.status), .message)]
    Api {
        /// HTTP status from the remote endpoint, if one was received.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The remote endpoint answered with a success status but the body
    /// did not have the expected shape.
    #[error("Unexpected response shape: {message}")]
    ResponseShape {
        /// What was expected and what was found.
        message: String,
        /// The raw response body, kept for diagnosis.
        body: String,
    },
}

/// Renders " (429)" when a status was received, nothing otherwise.
fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!(" ({status})"),
        None => String::new(),
    }
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an authentication error without an HTTP status.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            status: None,
            message: message.into(),
        }
    }

    /// Creates an authentication error carrying the HTTP status.
    pub fn auth_status(status: u16, message: impl Into<String>) -> Self {
        Self::Auth {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates an API error without an HTTP status.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Creates an API error carrying the HTTP status.
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a response shape error carrying the raw body.
    pub fn response_shape(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::ResponseShape {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Returns the HTTP status code if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the raw response body for shape errors.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::ResponseShape { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true when a remote endpoint rejected our bearer token,
    /// which invalidates the cached token for the credential.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            Self::Api {
                status: Some(401) | Some(403),
                ..
            }
        )
    }
}

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_extraction() {
        assert_eq!(Error::auth_status(400, "bad key").status(), Some(400));
        assert_eq!(Error::api_status(503, "down").status(), Some(503));
        assert_eq!(Error::configuration("missing").status(), None);
        assert_eq!(Error::response_shape("odd", "{}").status(), None);
    }

    #[test]
    fn test_shape_error_keeps_body() {
        let err = Error::response_shape("missing predictions", r#"{"oops":true}"#);
        assert_eq!(err.body(), Some(r#"{"oops":true}"#));
        assert!(Error::api("gone").body().is_none());
    }

    #[test]
    fn test_auth_rejection_detection() {
        assert!(Error::api_status(401, "expired").is_auth_rejection());
        assert!(Error::api_status(403, "denied").is_auth_rejection());
        assert!(!Error::api_status(500, "boom").is_auth_rejection());
        assert!(!Error::api("timeout").is_auth_rejection());
        assert!(!Error::auth_status(401, "bad key").is_auth_rejection());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::configuration("WML_API_KEY is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: WML_API_KEY is not set"
        );

        let err = Error::auth_status(400, "invalid apikey");
        assert_eq!(err.to_string(), "Authentication error (400): invalid apikey");

        let err = Error::auth("identity endpoint unreachable");
        assert_eq!(
            err.to_string(),
            "Authentication error: identity endpoint unreachable"
        );
    }

    #[test]
    fn test_display_keeps_received_status() {
        let err = Error::api_status(500, "scoring request failed: internal failure");
        assert_eq!(
            err.to_string(),
            "API error (500): scoring request failed: internal failure"
        );

        let err = Error::api("connection reset");
        assert_eq!(err.to_string(), "API error: connection reset");
    }
}
