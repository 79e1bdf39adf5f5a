use serde::{Deserialize, Serialize};

/// Request payload for /generate-response.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// What the user wants help with.
    pub question: String,
    /// Free-form tone hint, forwarded into the prompt.
    #[serde(default)]
    pub tone: Option<String>,
}

/// Response payload for /generate-response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}
