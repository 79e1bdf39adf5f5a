use std::fmt;

use crate::config::llm_provider::LlmProvider;

/// Sampling/length parameters sent with a single generation call.
///
/// Unset fields are omitted from the request so the provider default applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_output_tokens: Option<u32>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,
    /// Generation stops when any of these is produced.
    pub stop_sequences: Vec<String>,
}

/// Configuration for the language-model backend.
///
/// # Fields
///
/// - `provider`: which backend to call (Gemini or OpenAI-compatible).
/// - `model`: model identifier (e.g. `"gemini-2.0-flash"`).
/// - `endpoint`: API base URL, without the versioned path.
/// - `api_key`: credential for the provider.
/// - `timeout_secs`: optional request timeout in seconds.
/// - `chat`: default generation options for conversational turns.
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub chat: GenerationOptions,
}

impl fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("chat", &self.chat)
            .finish()
    }
}
