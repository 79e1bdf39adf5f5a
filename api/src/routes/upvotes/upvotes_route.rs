use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use resource_store::{Created, Upvote, UpvoteCreate};
use tracing::{info, instrument, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::upvotes::upvote_count_response::UpvoteCountResponse,
};

/// Handler: POST /responses/{id}/upvote
///
/// The response id comes from the path; a `response_id` in the body is ignored.
#[instrument(skip(state, body), fields(user_id = %body.user_id))]
pub async fn upvote(
    State(state): State<Arc<AppState>>,
    Path(response_id): Path<String>,
    Json(body): Json<UpvoteCreate>,
) -> AppResult<Json<Created<Upvote>>> {
    if body
        .response_id
        .as_deref()
        .is_some_and(|id| id != response_id)
    {
        warn!(body_response_id = ?body.response_id, "body response_id differs from path, using path");
    }
    let created = state.resources.create_upvote(&response_id, &body).await?;
    info!("upvote stored");
    Ok(Json(created))
}

/// Handler: GET /responses/{id}/upvotes
#[instrument(skip(state))]
pub async fn upvote_count(
    State(state): State<Arc<AppState>>,
    Path(response_id): Path<String>,
) -> AppResult<Json<UpvoteCountResponse>> {
    let count = state.resources.count_upvotes(&response_id).await?;
    Ok(Json(UpvoteCountResponse { count }))
}
