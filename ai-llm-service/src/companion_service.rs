//! Companion service: the one entry point the HTTP layer talks to.
//!
//! Two modes share one provider client:
//! - **Stateless**: persona + question framed into a single prompt, fixed
//!   sampling (`0.7` / `200` tokens / stop on `"\n*"`), nothing remembered.
//! - **Conversational**: per-session history replayed on every turn, the
//!   persona sent as system instruction, the exchange appended on success.
//!
//! Construct once, wrap in `Arc`, share between handlers.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::chat_session::InMemorySessionStore;
//! use ai_llm_service::companion_service::{CompanionRequest, CompanionService};
//! use ai_llm_service::config::default_config::config_from_env;
//! use ai_llm_service::persona::SYSTEM_PROMPT;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = config_from_env()?;
//! let store = Arc::new(InMemorySessionStore::new(SYSTEM_PROMPT, cfg.history_max_exchanges));
//! let svc = CompanionService::new(&cfg.llm, store)?;
//!
//! let reply = svc
//!     .reply(CompanionRequest::conversational(None, "Hello"))
//!     .await?;
//! println!("{} ({:?})", reply.text, reply.session_id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    chat_session::{SessionSnapshot, SessionStore},
    config::llm_model_config::{GenerationOptions, LlmModelConfig},
    error_handler::{AiLlmError, BlankInput},
    persona::{self, CONFIG_FALLBACK, GENERIC_FALLBACK},
    services::{ChatPrompt, LlmClient},
};

/// What the caller wants answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanionRequest {
    Stateless {
        question: String,
        tone: Option<String>,
    },
    Conversational {
        session_id: String,
        message: String,
    },
}

impl CompanionRequest {
    pub fn stateless(question: impl Into<String>, tone: Option<String>) -> Self {
        CompanionRequest::Stateless {
            question: question.into(),
            tone,
        }
    }

    /// A missing or blank `session_id` starts a fresh session with a v4 UUID.
    pub fn conversational(session_id: Option<String>, message: impl Into<String>) -> Self {
        CompanionRequest::Conversational {
            session_id: session_id_or_new(session_id),
            message: message.into(),
        }
    }

    fn user_text(&self) -> &str {
        match self {
            CompanionRequest::Stateless { question, .. } => question,
            CompanionRequest::Conversational { message, .. } => message,
        }
    }

    fn session_id(&self) -> Option<&str> {
        match self {
            CompanionRequest::Stateless { .. } => None,
            CompanionRequest::Conversational { session_id, .. } => Some(session_id),
        }
    }
}

/// Trimmed caller-supplied id, or a fresh v4 UUID when it is missing or blank.
pub fn session_id_or_new(session_id: Option<String>) -> String {
    session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Reply text plus the session it belongs to (conversational only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionReply {
    pub text: String,
    pub session_id: Option<String>,
    /// `true` when `text` is one of the canned apologies.
    pub fallback: bool,
}

pub struct CompanionService {
    client: LlmClient,
    chat_options: GenerationOptions,
    stateless_options: GenerationOptions,
    sessions: Arc<dyn SessionStore>,
}

impl CompanionService {
    /// Builds the provider client described by `cfg`.
    ///
    /// # Errors
    /// Whatever the provider constructor reports (missing key, bad endpoint).
    pub fn new(cfg: &LlmModelConfig, sessions: Arc<dyn SessionStore>) -> Result<Self, AiLlmError> {
        let client = LlmClient::from_config(cfg)?;
        info!(provider = %cfg.provider, model = %cfg.model, "companion service ready");
        Ok(Self {
            client,
            chat_options: cfg.chat.clone(),
            stateless_options: persona::stateless_options(),
            sessions,
        })
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Strict variant: any provider failure is returned to the caller and, in
    /// conversational mode, leaves the session history untouched.
    ///
    /// # Errors
    /// - [`AiLlmError::InvalidInput`] for a blank question/message
    /// - any provider or transport error
    #[instrument(skip_all, fields(session_id = ?req.session_id()))]
    pub async fn try_reply(&self, req: CompanionRequest) -> Result<CompanionReply, AiLlmError> {
        if req.user_text().trim().is_empty() {
            return Err(AiLlmError::InvalidInput("message must not be blank"));
        }

        match req {
            CompanionRequest::Stateless { question, tone } => {
                let text = self.respond_once(&question, tone.as_deref()).await?;
                Ok(CompanionReply {
                    text,
                    session_id: None,
                    fallback: false,
                })
            }
            CompanionRequest::Conversational {
                session_id,
                message,
            } => {
                let text = self.chat(&session_id, &message).await?;
                Ok(CompanionReply {
                    text,
                    session_id: Some(session_id),
                    fallback: false,
                })
            }
        }
    }

    /// Soft variant: provider failures become a canned reply.
    ///
    /// # Errors
    /// Only [`BlankInput`]; everything else degrades to text.
    pub async fn reply(&self, req: CompanionRequest) -> Result<CompanionReply, BlankInput> {
        let session_id = req.session_id().map(str::to_string);
        match self.try_reply(req).await {
            Ok(reply) => Ok(reply),
            Err(AiLlmError::InvalidInput(reason)) => Err(BlankInput(reason)),
            Err(e) => {
                warn!(error = %e, session_id = ?session_id, "generation failed, replying with fallback");
                Ok(CompanionReply {
                    text: fallback_text(&e).to_string(),
                    session_id,
                    fallback: true,
                })
            }
        }
    }

    /// One-shot answer with the persona framed into the prompt itself.
    pub async fn respond_once(
        &self,
        question: &str,
        tone: Option<&str>,
    ) -> Result<String, AiLlmError> {
        let prompt = persona::stateless_prompt(question, tone);
        let text = self
            .client
            .generate(&ChatPrompt {
                system: None,
                history: &[],
                message: &prompt,
                options: &self.stateless_options,
            })
            .await?;
        Ok(text.trim().to_string())
    }

    /// One conversational turn. The session lock is held across the model
    /// call so turns within a session never interleave.
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String, AiLlmError> {
        let session = self.sessions.get_or_create(session_id);
        let mut guard = session.lock().await;

        let text = self
            .client
            .generate(&ChatPrompt {
                system: Some(&guard.system_instruction),
                history: &guard.history,
                message,
                options: &self.chat_options,
            })
            .await?;
        let text = text.trim().to_string();

        guard.push_exchange(message, text.clone());
        info!(session_id, exchanges = guard.exchanges(), "chat turn stored");
        Ok(text)
    }

    /// Copy of a session's history, `None` for unknown ids.
    pub async fn history(&self, session_id: &str) -> Option<SessionSnapshot> {
        let session = self.sessions.get(session_id)?;
        let guard = session.lock().await;
        Some(guard.snapshot())
    }

    /// Forgets a session. Returns `false` if it did not exist.
    pub fn end_session(&self, session_id: &str) -> bool {
        self.sessions.evict(session_id)
    }
}

/// Canned apology matching the failure class.
pub fn fallback_text(err: &AiLlmError) -> &'static str {
    if err.is_configuration() {
        CONFIG_FALLBACK
    } else {
        GENERIC_FALLBACK
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{
        chat_session::{ChatRole, InMemorySessionStore},
        config::llm_provider::LlmProvider,
        persona::SYSTEM_PROMPT,
    };

    const GENERATE: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn service(endpoint: String) -> CompanionService {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-2.0-flash".into(),
            endpoint,
            api_key: Some("g-key".into()),
            timeout_secs: Some(5),
            chat: GenerationOptions {
                temperature: Some(0.7),
                ..GenerationOptions::default()
            },
        };
        let store = Arc::new(InMemorySessionStore::new(SYSTEM_PROMPT, None));
        CompanionService::new(&cfg, store).unwrap()
    }

    fn gemini_text(text: &str) -> Value {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
    }

    #[tokio::test]
    async fn stateless_uses_fixed_sampling_and_framed_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "maxOutputTokens": 200,
                    "stopSequences": ["\n*"]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("  You are not alone.  ")))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(server.uri());
        let reply = svc
            .try_reply(CompanionRequest::stateless("How do I cope?", Some("advice".into())))
            .await
            .unwrap();
        assert_eq!(reply.text, "You are not alone.");
        assert_eq!(reply.session_id, None);
        assert!(svc.sessions().is_empty());

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Preferred tone: advice"));
        assert!(prompt.ends_with("User: How do I cope?\n\nAI:"));
        assert!(body.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn second_turn_replays_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("Reply")))
            .expect(2)
            .mount(&server)
            .await;

        let svc = service(server.uri());
        let first = svc
            .reply(CompanionRequest::conversational(None, "Hello"))
            .await
            .unwrap();
        let sid = first.session_id.clone().unwrap();
        assert!(!first.fallback);

        let second = svc
            .reply(CompanionRequest::conversational(Some(sid.clone()), "Again"))
            .await
            .unwrap();
        assert_eq!(second.session_id.as_deref(), Some(sid.as_str()));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[1].body).unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["parts"][0]["text"], "Hello");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "Again");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_PROMPT);

        let snap = svc.history(&sid).await.unwrap();
        assert_eq!(snap.history.len(), 4);
        assert_eq!(snap.history[3].role, ChatRole::Model);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_and_keeps_history_clean() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let svc = service(server.uri());
        let reply = svc
            .reply(CompanionRequest::conversational(Some("s-1".into()), "Hi"))
            .await
            .unwrap();
        assert!(reply.fallback);
        assert_eq!(reply.text, GENERIC_FALLBACK);
        assert_eq!(reply.session_id.as_deref(), Some("s-1"));
        assert!(svc.history("s-1").await.unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn credential_rejection_uses_configuration_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let svc = service(server.uri());
        let reply = svc
            .reply(CompanionRequest::stateless("hi", None))
            .await
            .unwrap();
        assert_eq!(reply.text, CONFIG_FALLBACK);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_calling_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("x")))
            .expect(0)
            .mount(&server)
            .await;

        let svc = service(server.uri());
        let err = svc
            .reply(CompanionRequest::conversational(None, "   "))
            .await
            .unwrap_err();
        assert_eq!(err, BlankInput("message must not be blank"));
    }

    #[test]
    fn blank_session_id_gets_fresh_uuid() {
        let CompanionRequest::Conversational { session_id, .. } =
            CompanionRequest::conversational(Some("  ".into()), "hi")
        else {
            panic!("expected conversational request");
        };
        assert!(Uuid::parse_str(&session_id).is_ok());
        assert_eq!(session_id_or_new(Some(" s-9 ".into())), "s-9");
    }
}
