//! Connection settings for the resource API, read from the environment.
//!
//! # Environment variables
//! - `SUPABASE_URL`              = project URL, `/rest/v1` is appended (mandatory)
//! - `SUPABASE_SERVICE_KEY`      = service-role key used as bearer credential (mandatory)
//! - `RESOURCE_API_TIMEOUT_SECS` = request timeout in seconds (optional, default 30)

use std::fmt;

use crate::errors::{ResourceConfigError, ResourceResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resource API connection settings.
#[derive(Clone)]
pub struct ResourceConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service-role key.
    pub service_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

// Keeps the key out of logs.
impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ResourceConfig {
    /// Loads settings from process environment.
    ///
    /// # Errors
    /// - [`ResourceConfigError::MissingVar`] if URL or key is absent/empty
    /// - [`ResourceConfigError::InvalidBaseUrl`] if the URL is not http(s)
    /// - [`ResourceConfigError::InvalidNumber`] if the timeout is not a u64
    pub fn from_env() -> ResourceResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ResourceConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> ResourceResult<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ResourceConfigError::MissingVar(name))
        };

        let base_url = required("SUPABASE_URL")?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ResourceConfigError::InvalidBaseUrl {
                var: "SUPABASE_URL",
                reason: "must start with http:// or https://",
            }
            .into());
        }
        let service_key = required("SUPABASE_SERVICE_KEY")?;

        let timeout_secs = match lookup("RESOURCE_API_TIMEOUT_SECS") {
            Some(v) if !v.trim().is_empty() => {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| ResourceConfigError::InvalidNumber {
                        var: "RESOURCE_API_TIMEOUT_SECS",
                        reason: "expected u64",
                    })?
            }
            _ => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            service_key,
            timeout_secs,
        })
    }

    /// REST root, e.g. `https://xyz.supabase.co/rest/v1`.
    pub fn rest_base(&self) -> String {
        format!("{}/rest/v1", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::ResourceError;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_with_default_timeout() {
        let cfg = ResourceConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://demo.supabase.co/"),
            ("SUPABASE_SERVICE_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.rest_base(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = ResourceConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.co")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Config(ResourceConfigError::MissingVar("SUPABASE_SERVICE_KEY"))
        ));
    }

    #[test]
    fn rejects_non_http_url_and_bad_timeout() {
        let err = ResourceConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "demo.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Config(ResourceConfigError::InvalidBaseUrl { .. })
        ));

        let err = ResourceConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_SERVICE_KEY", "k"),
            ("RESOURCE_API_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Config(ResourceConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn debug_output_hides_key() {
        let cfg = ResourceConfig {
            base_url: "http://localhost".into(),
            service_key: "very-secret".into(),
            timeout_secs: 5,
        };
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
