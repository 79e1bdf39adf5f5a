use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ErrorEnvelope};

const REQUEST_ID: &str = "X-Request-Id";

/// Fields a client can get wrong, in the order they are looked up.
const KNOWN_FIELDS: [&str; 9] = [
    "question_id",
    "response_id",
    "session_id",
    "user_id",
    "is_emoji",
    "content",
    "question",
    "message",
    "tone",
];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    // serde: "missing field `content`"
    if let Some(rest) = msg.split("missing field `").nth(1) {
        if let Some(field) = rest.split('`').next() {
            return Some(field.to_string());
        }
    }
    // axum: "...into the target type: tone: unknown variant ..."
    KNOWN_FIELDS
        .iter()
        .find(|key| msg.contains(&format!("{key}:")) || msg.contains(&format!("`{key}`")))
        .or_else(|| KNOWN_FIELDS.iter().find(|key| msg.contains(*key)))
        .map(|key| key.to_string())
}

fn hint_from_serde_msg(msg: &str) -> Option<String> {
    if msg.contains("unknown variant") {
        Some("Allowed tones: \"advice\", \"just_listen\", \"encouragement\".".into())
    } else if msg.contains("missing field") {
        Some("This field is required.".into())
    } else if msg.contains("expected a map") || msg.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"field\": \"value\" }).".into())
    } else if msg.contains("Content-Type") {
        Some("Send the body with `Content-Type: application/json`.".into())
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts.headers.get(REQUEST_ID).and_then(|h| h.to_str().ok()) {
        if !v.trim().is_empty() {
            return v.to_string();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(value) = HeaderValue::from_str(&id) {
        parts.headers.insert(REQUEST_ID, value);
    }
    id
}

/// Rewrites axum's plain-text 400/422 rejections into the JSON error envelope.
///
/// Responses that are already JSON (our own `AppError`s) pass through with
/// only the request id attached.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let request_id = ensure_request_id(&mut parts);

    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let original = String::from_utf8_lossy(&bytes);
    tracing::debug!(%request_id, %status, rejection = %original.trim(), "request rejected");

    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&original),
        hint: hint_from_serde_msg(&original),
    };

    let envelope = ErrorEnvelope::new(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![detail],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_missing_field_name() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `content` at line 1 column 20";
        assert_eq!(guess_path_from_serde_msg(msg).as_deref(), Some("content"));
        assert_eq!(hint_from_serde_msg(msg).as_deref(), Some("This field is required."));
    }

    #[test]
    fn finds_field_with_bad_variant() {
        let msg = "Failed to deserialize the JSON body into the target type: tone: unknown variant `rant`, expected one of `advice`, `just_listen`, `encouragement` at line 1 column 50";
        assert_eq!(guess_path_from_serde_msg(msg).as_deref(), Some("tone"));
        assert!(hint_from_serde_msg(msg).unwrap().contains("just_listen"));
    }
}
