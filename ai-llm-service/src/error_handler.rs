//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`]). Small helpers for reading/validating environment variables
//! are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider call failed (status, decoding, empty reply).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),

    /// Caller-supplied input rejected before any provider call.
    #[error("[AI LLM Service] invalid input: {0}")]
    InvalidInput(&'static str),
}

impl AiLlmError {
    /// True when the failure points at credentials or setup rather than a
    /// transient provider problem.
    pub fn is_configuration(&self) -> bool {
        match self {
            AiLlmError::Config(_) => true,
            AiLlmError::Provider(p) => match &p.kind {
                ProviderErrorKind::InvalidProvider
                | ProviderErrorKind::MissingApiKey
                | ProviderErrorKind::InvalidEndpoint(_) => true,
                ProviderErrorKind::HttpStatus(http) => {
                    if matches!(http.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                        return true;
                    }
                    let lower = http.snippet.to_lowercase();
                    lower.contains("api key")
                        || lower.contains("api_key")
                        || lower.contains("credentials")
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// The only failure the soft companion entry point reports: the caller sent
/// a blank question or message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("[AI LLM Service] invalid input: {0}")]
pub struct BlankInput(pub &'static str);

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Errors that realistically happen at config load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `CHAT_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_PROVIDER`.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Which backend produced a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAI,
}

/// Non-2xx reply details.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Short, trimmed snippet of the response body.
    pub snippet: String,
}

#[derive(Debug)]
pub enum ProviderErrorKind {
    /// The config targets a different provider than the client.
    InvalidProvider,
    /// No API key configured.
    MissingApiKey,
    /// Endpoint is empty or not http(s).
    InvalidEndpoint(String),
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Payload could not be decoded as expected.
    Decode(String),
    /// The model answered with no text (e.g., blocked by safety filters).
    EmptyReply(Option<String>),
}

/// A provider call failure tagged with its backend.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider:?}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::InvalidProvider => f.write_str("invalid provider for this client"),
            ProviderErrorKind::MissingApiKey => f.write_str("missing API key"),
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::HttpStatus(h) => {
                write!(f, "HTTP {} from {}: {}", h.status, h.url, h.snippet)
            }
            ProviderErrorKind::Decode(m) => write!(f, "decode error: {m}"),
            ProviderErrorKind::EmptyReply(Some(reason)) => {
                write!(f, "empty reply (finish reason: {reason})")
            }
            ProviderErrorKind::EmptyReply(None) => f.write_str("empty reply"),
        }
    }
}

/// Trims a response body to a log-friendly snippet.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let mut s: String = trimmed.chars().take(MAX).collect();
        s.push('…');
        s
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable from `env`.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env<F>(env: &F, name: &'static str) -> Result<String>
where
    F: Fn(&'static str) -> Option<String>,
{
    match env(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Optional, non-empty variable.
pub fn env_opt<F>(env: &F, name: &'static str) -> Option<String>
where
    F: Fn(&'static str) -> Option<String>,
{
    env(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u32` (`Ok(None)` if unset/empty).
pub fn env_opt_u32<F>(env: &F, name: &'static str) -> Result<Option<u32>>
where
    F: Fn(&'static str) -> Option<String>,
{
    match env_opt(env, name) {
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
pub fn env_opt_u64<F>(env: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&'static str) -> Option<String>,
{
    match env_opt(env, name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `f32` (`Ok(None)` if unset/empty).
pub fn env_opt_f32<F>(env: &F, name: &'static str) -> Result<Option<f32>>
where
    F: Fn(&'static str) -> Option<String>,
{
    match env_opt(env, name) {
        Some(v) => v.parse::<f32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected a decimal number",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: StatusCode, snippet: &str) -> AiLlmError {
        ProviderError::new(
            Provider::Gemini,
            ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: "http://llm".into(),
                snippet: snippet.into(),
            }),
        )
        .into()
    }

    #[test]
    fn credential_failures_are_configuration() {
        assert!(http_err(StatusCode::UNAUTHORIZED, "").is_configuration());
        assert!(
            http_err(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key.")
                .is_configuration()
        );
        assert!(!http_err(StatusCode::SERVICE_UNAVAILABLE, "overloaded").is_configuration());
        assert!(!AiLlmError::Timeout(Duration::from_secs(1)).is_configuration());
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(make_snippet(&long).chars().count(), 241);
        assert_eq!(make_snippet("  short  "), "short");
    }

    #[test]
    fn numeric_env_parsing() {
        let env = |name: &'static str| match name {
            "GOOD" => Some("200".to_string()),
            "BAD" => Some("lots".to_string()),
            "BLANK" => Some("  ".to_string()),
            _ => None,
        };
        assert_eq!(env_opt_u32(&env, "GOOD").unwrap(), Some(200));
        assert_eq!(env_opt_u32(&env, "BLANK").unwrap(), None);
        assert!(matches!(
            env_opt_u64(&env, "BAD"),
            Err(AiLlmError::Config(ConfigError::InvalidNumber { var: "BAD", .. }))
        ));
        assert!(matches!(
            must_env(&env, "MISSING"),
            Err(AiLlmError::Config(ConfigError::MissingVar("MISSING")))
        ));
    }

    #[test]
    fn ranges_reject_nan_and_outliers() {
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
    }
}
