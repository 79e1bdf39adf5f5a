//! Response routes: create, read, per-question listing, trending and "my responses".

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use resource_store::{Created, Response, ResponseCreate};
use tracing::{debug, info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::owner_query::OwnerQuery,
};

/// Handler: POST /responses
#[instrument(skip_all, fields(question_id = %body.question_id, user_id = %body.user_id))]
pub async fn create_response(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResponseCreate>,
) -> AppResult<Json<Created<Response>>> {
    let created = state.resources.create_response(&body).await?;
    info!(stored = created.record().is_some(), "response created");
    Ok(Json(created))
}

/// Handler: GET /questions/{question_id}/responses
#[instrument(skip(state))]
pub async fn responses_for_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> AppResult<Json<Vec<Response>>> {
    Ok(Json(
        state
            .resources
            .list_responses_for_question(&question_id)
            .await?,
    ))
}

/// Handler: GET /responses/{id}
#[instrument(skip(state))]
pub async fn get_response(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Response>> {
    state
        .resources
        .get_response(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Response"))
}

/// Handler: GET /trending
#[instrument(skip_all)]
pub async fn trending(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Response>>> {
    let rows = state.resources.trending_responses().await?;
    debug!(count = rows.len(), "trending responses");
    Ok(Json(rows))
}

/// Handler: GET /my/responses?user_id=
#[instrument(skip_all, fields(user_id = %query.user_id))]
pub async fn my_responses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<Json<Vec<Response>>> {
    let user_id = query.user_id()?;
    Ok(Json(state.resources.list_responses_by_user(user_id).await?))
}
