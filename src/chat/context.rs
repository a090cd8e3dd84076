use crate::db::Message;
use crate::llm::models::Message as LlmMessage;

/// Converts stored history into completion-service turns, preserving order.
pub fn build_prompt(history: &[Message]) -> Vec<LlmMessage> {
    history
        .iter()
        .map(|m| LlmMessage {
            role: if m.is_from_user() { "user" } else { "assistant" }.to_string(),
            content: m.content.clone(),
        })
        .collect()
}
