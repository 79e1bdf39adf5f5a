use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;


use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::{AppState, ConfigError};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        chatbot::{chat_route::chat, session_route},
        comments::comments_route::{create_comment, list_comments},
        generate::generate_response_route::generate_response,
        questions::questions_route::{create_question, get_question, list_questions, my_questions},
        responses::responses_route::{
            create_response, get_response, my_responses, responses_for_question, trending,
        },
        root_route::root,
        upvotes::upvotes_route::{upvote, upvote_count},
    },
};

/// Listen address used when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";

/// Loads state from the environment, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = build_router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "AskHer backend listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Every route of the service, with the JSON rejection mapper applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        // questions
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", get(get_question))
        .route("/questions/{id}/responses", get(responses_for_question))
        .route("/my/questions", get(my_questions))
        // responses
        .route("/responses", post(create_response))
        .route("/responses/{id}", get(get_response))
        .route("/trending", get(trending))
        .route("/my/responses", get(my_responses))
        // upvotes & comments
        .route("/responses/{id}/upvote", post(upvote))
        .route("/responses/{id}/upvotes", get(upvote_count))
        .route(
            "/responses/{id}/comments",
            get(list_comments).post(create_comment),
        )
        // companion
        .route("/generate-response", post(generate_response))
        .route("/chatbot/chat", post(chat))
        .route("/chatbot/history/{session_id}", get(session_route::history))
        .route(
            "/chatbot/sessions/{session_id}",
            delete(session_route::end_session),
        )
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
