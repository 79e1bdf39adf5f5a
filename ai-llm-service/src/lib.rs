//! Language-model side of the AskHer backend.
//!
//! - [`companion_service`]: stateless and conversational replies with fallbacks
//! - [`chat_session`]: per-session history behind the [`chat_session::SessionStore`] seam
//! - [`services`]: Gemini and OpenAI clients
//! - [`persona`]: system prompt and canned replies

pub mod chat_session;
pub mod companion_service;
pub mod config;
pub mod error_handler;
pub mod persona;
pub mod services;
pub mod telemetry;
