use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Backend used for language-model inference.
///
/// Selected with `LLM_PROVIDER` (`gemini` by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenAI (or compatible) chat completions API.
    OpenAI,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenAI => "openai",
        })
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
