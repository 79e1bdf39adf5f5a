//! Provider clients and the provider-agnostic prompt they consume.

pub mod gemini_service;
pub mod open_ai_service;

use crate::{
    chat_session::ChatTurn,
    config::{
        llm_model_config::{GenerationOptions, LlmModelConfig},
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    services::{gemini_service::GeminiService, open_ai_service::OpenAiService},
};

/// One generation request: optional system instruction, prior turns, new message.
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompt<'a> {
    pub system: Option<&'a str>,
    pub history: &'a [ChatTurn],
    pub message: &'a str,
    pub options: &'a GenerationOptions,
}

/// The configured provider client.
#[derive(Debug)]
pub enum LlmClient {
    Gemini(GeminiService),
    OpenAI(OpenAiService),
}

impl LlmClient {
    /// Builds the client matching `cfg.provider`.
    pub fn from_config(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        match cfg.provider {
            LlmProvider::Gemini => Ok(LlmClient::Gemini(GeminiService::new(cfg)?)),
            LlmProvider::OpenAI => Ok(LlmClient::OpenAI(OpenAiService::new(cfg)?)),
        }
    }

    pub async fn generate(&self, prompt: &ChatPrompt<'_>) -> Result<String, AiLlmError> {
        match self {
            LlmClient::Gemini(cli) => cli.generate(prompt).await,
            LlmClient::OpenAI(cli) => cli.generate(prompt).await,
        }
    }
}
