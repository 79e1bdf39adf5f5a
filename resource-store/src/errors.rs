//! Crate-wide error hierarchy for resource-store.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Root error type for the resource-store crate.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Configuration problems (missing key, bad base URL, etc.).
    #[error(transparent)]
    Config(#[from] ResourceConfigError),

    /// Payload rejected locally; no request was sent.
    #[error("invalid `{field}`: {reason}")]
    Validation {
        /// Offending field name.
        field: &'static str,
        /// Human-readable reason.
        reason: &'static str,
    },

    /// The resource API answered with a status this client does not accept.
    /// `body` is the upstream text, untouched.
    #[error("{body}")]
    Upstream {
        /// Numeric HTTP status returned by the resource API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Timeout at transport level.
    #[error("resource api request timed out")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of the resource API response.
    #[error("invalid resource api response: {0}")]
    InvalidResponse(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ResourceConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Base URL is not an http(s) URL.
    #[error("invalid base url in {var}: {reason}")]
    InvalidBaseUrl {
        var: &'static str,
        reason: &'static str,
    },

    /// A number failed to parse.
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Credential cannot be used as an HTTP header value.
    #[error("credential is not a valid header value")]
    InvalidCredential,

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for ResourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ResourceError::Timeout;
        }
        if e.is_decode() {
            return ResourceError::InvalidResponse(e.to_string());
        }
        ResourceError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(e: serde_json::Error) -> Self {
        ResourceError::InvalidResponse(e.to_string())
    }
}
