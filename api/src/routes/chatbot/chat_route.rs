use std::sync::Arc;

use ai_llm_service::companion_service::{CompanionRequest, session_id_or_new};
use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::chatbot::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /chatbot/chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/chatbot/chat \
///   -H 'content-type: application/json' \
///   -d '{"message":"Hi, rough day.","session_id":null}'
/// ```
#[instrument(skip_all, fields(has_session = body.session_id.is_some()))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let session_id = session_id_or_new(body.session_id);
    let reply = state
        .companion
        .reply(CompanionRequest::Conversational {
            session_id: session_id.clone(),
            message: body.message,
        })
        .await?;

    info!(%session_id, fallback = reply.fallback, "chat reply");
    Ok(Json(ChatResponse {
        response: reply.text,
        session_id,
    }))
}
