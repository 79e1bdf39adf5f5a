use std::sync::Arc;

use ai_llm_service::chat_session::SessionSnapshot;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chatbot::chat_request::EvictResponse,
};

/// Handler: GET /chatbot/history/{session_id}
#[instrument(skip(state))]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSnapshot>> {
    state
        .companion
        .history(&session_id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("Session"))
}

/// Handler: DELETE /chatbot/sessions/{session_id}
#[instrument(skip(state))]
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<EvictResponse> {
    let evicted = state.companion.end_session(&session_id);
    info!(evicted, "session evicted");
    Json(EvictResponse {
        session_id,
        evicted,
    })
}
