use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use resource_store::{Comment, CommentCreate, Created};
use tracing::{info, instrument};

use crate::{core::app_state::AppState, error_handler::AppResult};

/// Handler: POST /responses/{id}/comments
#[instrument(skip(state, body), fields(user_id = %body.user_id))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(response_id): Path<String>,
    Json(body): Json<CommentCreate>,
) -> AppResult<Json<Created<Comment>>> {
    let created = state.resources.create_comment(&response_id, &body).await?;
    info!("comment stored");
    Ok(Json(created))
}

/// Handler: GET /responses/{id}/comments (oldest first)
#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(response_id): Path<String>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.resources.list_comments(&response_id).await?))
}
