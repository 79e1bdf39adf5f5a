use serde::{Deserialize, Serialize};

/// Request payload for /chatbot/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omit (or send blank) to start a new conversation.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response payload for /chatbot/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    /// Send this back to continue the same conversation.
    pub session_id: String,
}

/// Response payload for DELETE /chatbot/sessions/{session_id}.
#[derive(Debug, Serialize)]
pub struct EvictResponse {
    pub session_id: String,
    pub evicted: bool,
}
