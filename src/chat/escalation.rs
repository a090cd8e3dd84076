use crate::db::Message;

const RESPONSE_CUES: [&str; 2] = ["human agent", "transfer"];
const MESSAGE_CUES: [&str; 2] = ["speak to human", "talk to someone"];

/// Keyword heuristic deciding whether the widget should offer a human handoff.
pub fn needs_escalation(response: &str, message: &str) -> bool {
    let response = response.to_lowercase();
    let message = message.to_lowercase();
    RESPONSE_CUES.iter().any(|cue| response.contains(cue))
        || MESSAGE_CUES.iter().any(|cue| message.contains(cue))
}

pub fn latest_user_message(history: &[Message]) -> Option<&Message> {
    history.iter().rev().find(|m| m.is_from_user())
}
