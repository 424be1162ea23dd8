//! Error Types
//!
//! Error taxonomy for the social login engine. The four contract-level
//! kinds callers are expected to branch on are `Configuration`,
//! `InvalidState`, `Authorization` and `Token`; the remaining variants
//! cover transport and response-parsing failures.

use std::time::Duration;
use thiserror::Error;

/// Result type for social login operations.
pub type SocialResult<T> = Result<T, SocialAuthError>;

/// Root error type for the social login engine.
#[derive(Error, Debug)]
pub enum SocialAuthError {
    /// Construction-time configuration failure.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// CSRF state cookie and callback state parameter do not match.
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    /// The provider reported an error on the authorization callback.
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// The token endpoint rejected the code exchange.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Malformed callback request (e.g. missing authorization code).
    #[error("Invalid callback request: {message}")]
    InvalidRequest {
        /// What was wrong with the callback.
        message: String,
    },

    /// Network/transport failure while calling the token endpoint.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Malformed response from the provider.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl SocialAuthError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SOCIAL_CONFIG",
            Self::InvalidState(_) => "SOCIAL_STATE",
            Self::Authorization(_) => "SOCIAL_AUTH",
            Self::Token(_) => "SOCIAL_TOKEN",
            Self::InvalidRequest { .. } => "SOCIAL_REQUEST",
            Self::Network(_) => "SOCIAL_NETWORK",
            Self::Protocol(_) => "SOCIAL_PROTOCOL",
        }
    }
}

/// Configuration error. Surfaces at engine construction, never at call
/// time: an engine that constructed successfully has all required
/// credentials resolved.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A required configuration key resolved to nothing.
    #[error("Missing required configuration key `{key}`")]
    MissingKey {
        /// The configuration path that was looked up.
        key: String,
    },

    /// A provider endpoint is not a valid URL.
    #[error("Invalid endpoint URL `{url}`")]
    InvalidEndpoint {
        /// The offending URL string.
        url: String,
        /// Parse failure detail.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be initialized.
    #[error("Failed to build HTTP client: {message}")]
    HttpClient {
        /// Builder failure detail.
        message: String,
    },
}

/// CSRF state validation failure: the state cookie and the callback's
/// `state` query parameter must both be present and exactly equal.
/// Carries no detail on purpose; the two values must not leak into logs
/// or error pages.
#[derive(Error, Debug)]
#[error("State cookie and state query parameter are missing or do not match")]
pub struct InvalidStateError;

/// Error reported by the provider on the authorization callback
/// (RFC 6749 section 4.1.2.1), e.g. the end user declined consent.
#[derive(Error, Debug)]
#[error("Provider reported `{error}`")]
pub struct AuthorizationError {
    /// The provider's `error` code (e.g. `access_denied`).
    pub error: String,
    /// Optional `error_description` from the provider.
    pub description: Option<String>,
    /// Optional `error_uri` from the provider.
    pub uri: Option<String>,
}

/// Token endpoint rejection. Carries the response body verbatim so
/// callers can render or log exactly what the provider said.
#[derive(Error, Debug)]
#[error("Token endpoint responded with HTTP {status}")]
pub struct TokenError {
    /// HTTP status code returned by the token endpoint.
    pub status: u16,
    /// Parsed response body, uninterpreted.
    pub body: serde_json::Value,
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connection-level failure.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Transport failure detail.
        message: String,
    },

    /// The request did not complete in time.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Configured timeout.
        timeout: Duration,
    },
}

/// Response parsing/protocol error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A success response did not deserialize into the expected shape.
    #[error("Invalid token response: {message}")]
    InvalidTokenResponse {
        /// Deserialization failure detail.
        message: String,
    },

    /// The token endpoint tried to redirect; token endpoints never
    /// legitimately do that.
    #[error("Unexpected redirect to `{location}`")]
    UnexpectedRedirect {
        /// The `Location` header value.
        location: String,
    },
}
