//! Question routes: list, read, create and "my questions".

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use resource_store::{Created, Question, QuestionCreate};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::owner_query::OwnerQuery,
};

/// Handler: GET /questions
#[instrument(skip_all)]
pub async fn list_questions(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Question>>> {
    Ok(Json(state.resources.list_questions().await?))
}

/// Handler: GET /questions/{id}
#[instrument(skip(state))]
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Question>> {
    state
        .resources
        .get_question(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Question"))
}

/// Handler: POST /questions
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/questions \
///   -H 'content-type: application/json' \
///   -d '{"user_id":"u1","content":"How do I ask for a raise?","tone":"advice"}'
/// ```
#[instrument(skip_all, fields(user_id = %body.user_id, tone = body.tone.as_str()))]
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuestionCreate>,
) -> AppResult<Json<Created<Question>>> {
    let created = state.resources.create_question(&body).await?;
    info!(stored = created.record().is_some(), "question created");
    Ok(Json(created))
}

/// Handler: GET /my/questions?user_id=
#[instrument(skip_all, fields(user_id = %query.user_id))]
pub async fn my_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<Json<Vec<Question>>> {
    let user_id = query.user_id()?;
    Ok(Json(state.resources.list_questions_by_user(user_id).await?))
}
