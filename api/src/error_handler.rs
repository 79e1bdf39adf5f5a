use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ai_llm_service::error_handler::BlankInput;
use resource_store::ResourceError;
use thiserror::Error;
use tracing::error;

use crate::core::{
    app_state::ConfigError,
    http::response_envelope::{ApiErrorDetail, ErrorEnvelope},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid `{field}`: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation { .. } => "UNPROCESSABLE_ENTITY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Http { code, .. } => code,
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::Validation { field, .. } => vec![ApiErrorDetail {
                path: Some((*field).to_string()),
                hint: Some("Provide a non-blank value.".into()),
            }],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        ErrorEnvelope::new(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Resource API failures keep the upstream text in `message`.
impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Validation { field, reason } => AppError::Validation { field, reason },
            ResourceError::Upstream { body, .. } => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "UPSTREAM_ERROR",
                message: body,
            },
            ResourceError::Timeout => AppError::Http {
                status: StatusCode::GATEWAY_TIMEOUT,
                code: "UPSTREAM_TIMEOUT",
                message: err.to_string(),
            },
            ResourceError::Network(_) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "UPSTREAM_UNAVAILABLE",
                message: err.to_string(),
            },
            ResourceError::InvalidResponse(_) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "UPSTREAM_DECODE",
                message: err.to_string(),
            },
            ResourceError::Config(_) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "CONFIG_ERROR",
                message: err.to_string(),
            },
        }
    }
}

/// Provider failures never get here: the companion answers them with text.
impl From<BlankInput> for AppError {
    fn from(BlankInput(reason): BlankInput) -> Self {
        AppError::Validation {
            field: "message",
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_body_is_passed_through() {
        let err: AppError = ResourceError::Upstream {
            status: 500,
            body: "relation \"questions\" does not exist".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert_eq!(err.to_string(), "relation \"questions\" does not exist");
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err: AppError = ResourceError::Timeout.into();
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_code(), "UPSTREAM_TIMEOUT");
    }

    #[test]
    fn blank_fields_are_unprocessable() {
        let err: AppError = ResourceError::Validation {
            field: "content",
            reason: "must not be blank",
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details()[0].path.as_deref(), Some("content"));
    }

    #[test]
    fn blank_chat_message_points_at_message_field() {
        let err: AppError = BlankInput("message must not be blank").into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details()[0].path.as_deref(), Some("message"));
    }
}
