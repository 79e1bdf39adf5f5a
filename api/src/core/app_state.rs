use std::sync::Arc;

use ai_llm_service::{
    chat_session::InMemorySessionStore,
    companion_service::CompanionService,
    config::default_config::{CompanionConfig, config_from_lookup},
    error_handler::AiLlmError,
    persona::SYSTEM_PROMPT,
};
use resource_store::{ResourceClient, ResourceConfig, ResourceError};
use thiserror::Error;
use tracing::info;

/// Startup failures; every variant names the offending variable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resource api config: {0}")]
    Resource(#[from] ResourceError),

    #[error("language model config: {0}")]
    Llm(#[from] AiLlmError),
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Client for the questions/responses/comments/upvotes tables.
    pub resources: ResourceClient,
    /// Stateless and conversational replies.
    pub companion: CompanionService,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Every credential is checked here so a bad deployment fails at boot,
    /// not on the first request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let resource_cfg = ResourceConfig::from_lookup(&env)?;
        let companion_cfg = config_from_lookup(&env)?;
        Self::new(&resource_cfg, &companion_cfg)
    }

    pub fn new(
        resource_cfg: &ResourceConfig,
        companion_cfg: &CompanionConfig,
    ) -> Result<Self, ConfigError> {
        let resources = ResourceClient::new(resource_cfg)?;
        let sessions = Arc::new(InMemorySessionStore::new(
            SYSTEM_PROMPT,
            companion_cfg.history_max_exchanges,
        ));
        let companion = CompanionService::new(&companion_cfg.llm, sessions)?;

        info!(
            resource_api = %resource_cfg.rest_base(),
            provider = %companion_cfg.llm.provider,
            "application state ready"
        );

        Ok(Self {
            resources,
            companion,
        })
    }
}
