//! POST /generate-response: one-shot supportive reply, nothing remembered.

use std::sync::Arc;

use ai_llm_service::{companion_service::CompanionRequest, error_handler::BlankInput};
use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::generate::generate_request::{GenerateRequest, GenerateResponse},
};

/// Handler: POST /generate-response
///
/// Provider failures still answer 200 with a canned apology.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/generate-response \
///   -H 'content-type: application/json' \
///   -d '{"question":"I feel overwhelmed at work","tone":"encouragement"}'
/// ```
#[instrument(skip_all, fields(tone = ?body.tone))]
pub async fn generate_response(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let reply = state
        .companion
        .reply(CompanionRequest::stateless(body.question, body.tone))
        .await
        .map_err(|BlankInput(reason)| AppError::Validation {
            field: "question",
            reason,
        })?;
    info!(fallback = reply.fallback, "generated response");
    Ok(Json(GenerateResponse {
        response: reply.text,
    }))
}
