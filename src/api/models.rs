use serde::{Deserialize, Serialize};

// Fields default to empty so a missing value surfaces as a validation
// error from the chat service instead of a deserializer rejection.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateRequest {
    #[serde(default)]
    pub session_id: String,
    pub user_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscalateResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
