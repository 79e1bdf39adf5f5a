//! Companion LLM config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_PROVIDER`               = `gemini` (default) or `openai`
//! - `LLM_TIMEOUT_SECS`           = request timeout (default 60)
//! - `CHAT_MAX_TOKENS`            = optional max output tokens for chat turns (u32)
//! - `CHAT_TEMPERATURE`           = chat temperature, `0.0..=2.0` (default 0.7)
//! - `CHAT_HISTORY_MAX_EXCHANGES` = optional cap on remembered exchanges per session
//!
//! Gemini-specific:
//! - `GEMINI_API_KEY` (mandatory), `GEMINI_MODEL`, `GEMINI_URL`
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory), `OPENAI_MODEL`, `OPENAI_URL`

use crate::{
    config::{
        llm_model_config::{GenerationOptions, LlmModelConfig},
        llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.7;

/// Everything the companion service needs at startup.
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    pub llm: LlmModelConfig,
    /// `None` keeps every exchange for the life of the process.
    pub history_max_exchanges: Option<usize>,
}

/// Loads [`CompanionConfig`] from the process environment.
///
/// # Errors
/// - [`ConfigError::MissingVar`] if the selected provider's API key is absent
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_PROVIDER`
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad numbers
pub fn config_from_env() -> Result<CompanionConfig, AiLlmError> {
    config_from_lookup(|name| std::env::var(name).ok())
}

/// Same as [`config_from_env`] with a custom variable source.
pub fn config_from_lookup<F>(env: F) -> Result<CompanionConfig, AiLlmError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let provider = match env_opt(&env, "LLM_PROVIDER") {
        Some(raw) => raw.parse::<LlmProvider>()?,
        None => LlmProvider::Gemini,
    };

    let (key_var, model_var, url_var, default_model, default_url) = match provider {
        LlmProvider::Gemini => (
            "GEMINI_API_KEY",
            "GEMINI_MODEL",
            "GEMINI_URL",
            DEFAULT_GEMINI_MODEL,
            DEFAULT_GEMINI_URL,
        ),
        LlmProvider::OpenAI => (
            "OPENAI_API_KEY",
            "OPENAI_MODEL",
            "OPENAI_URL",
            DEFAULT_OPENAI_MODEL,
            DEFAULT_OPENAI_URL,
        ),
    };

    let api_key = must_env(&env, key_var)?;
    let model = env_opt(&env, model_var).unwrap_or_else(|| default_model.to_string());
    let endpoint = env_opt(&env, url_var).unwrap_or_else(|| default_url.to_string());
    validate_http_endpoint(url_var, &endpoint)?;

    let temperature = env_opt_f32(&env, "CHAT_TEMPERATURE")?.unwrap_or(DEFAULT_CHAT_TEMPERATURE);
    validate_range_f32("CHAT_TEMPERATURE", temperature, 0.0, 2.0)?;

    let history_max_exchanges = match env_opt_u32(&env, "CHAT_HISTORY_MAX_EXCHANGES")? {
        Some(0) => {
            return Err(ConfigError::OutOfRange {
                field: "CHAT_HISTORY_MAX_EXCHANGES",
                detail: "expected at least 1",
            }
            .into());
        }
        other => other.map(|n| n as usize),
    };

    let llm = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: Some(api_key),
        timeout_secs: Some(env_opt_u64(&env, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        chat: GenerationOptions {
            temperature: Some(temperature),
            max_output_tokens: env_opt_u32(&env, "CHAT_MAX_TOKENS")?,
            top_p: None,
            stop_sequences: Vec::new(),
        },
    };

    Ok(CompanionConfig {
        llm,
        history_max_exchanges,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(vars: &[(&'static str, &'static str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, &'static str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn gemini_is_the_default_provider() {
        let cfg = config_from_lookup(env_of(&[("GEMINI_API_KEY", "g-key")])).unwrap();
        assert_eq!(cfg.llm.provider, LlmProvider::Gemini);
        assert_eq!(cfg.llm.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(cfg.llm.endpoint, DEFAULT_GEMINI_URL);
        assert_eq!(cfg.llm.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.llm.chat.temperature, Some(DEFAULT_CHAT_TEMPERATURE));
        assert_eq!(cfg.history_max_exchanges, None);
    }

    #[test]
    fn missing_gemini_key_is_fatal() {
        let err = config_from_lookup(env_of(&[])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("GEMINI_API_KEY"))
        ));
    }

    #[test]
    fn openai_provider_reads_its_own_vars() {
        let cfg = config_from_lookup(env_of(&[
            ("LLM_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("CHAT_MAX_TOKENS", "300"),
            ("CHAT_HISTORY_MAX_EXCHANGES", "20"),
        ]))
        .unwrap();
        assert_eq!(cfg.llm.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.llm.model, "gpt-4.1");
        assert_eq!(cfg.llm.chat.max_output_tokens, Some(300));
        assert_eq!(cfg.history_max_exchanges, Some(20));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from_lookup(env_of(&[
            ("GEMINI_API_KEY", "k"),
            ("CHAT_TEMPERATURE", "3.5"),
        ]))
        .is_err());
        assert!(config_from_lookup(env_of(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_URL", "generativelanguage.googleapis.com"),
        ]))
        .is_err());
        assert!(config_from_lookup(env_of(&[
            ("GEMINI_API_KEY", "k"),
            ("CHAT_HISTORY_MAX_EXCHANGES", "0"),
        ]))
        .is_err());
    }
}
