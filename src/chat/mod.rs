//! Message handling: FAQ short-circuit, completion fallback and escalation.

pub mod context;
pub mod escalation;
pub mod faq;

use serde::Serialize;
use std::sync::{Arc, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{service::DbService, DbPool, Message, Sender, Session};
use crate::error::ChatError;
use crate::llm::{models::ChatOptions, LlmProvider};

/// Number of stored messages sent to the completion service as context.
pub const HISTORY_LIMIT: usize = 20;
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 500;

pub const SYSTEM_PROMPT: &str = "You are a helpful customer support assistant. You provide clear, friendly, and professional responses to customer inquiries.
If you cannot answer a question or the customer seems frustrated, acknowledge their concern and suggest they may want to speak with a human agent.
Be concise but thorough. Always maintain a helpful and empathetic tone.";

/// Page size used when reading a whole session back.
const SESSION_PAGE: usize = 1000;

pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that request.";

pub const ESCALATION_CONFIRMATION: &str =
    "Your request has been escalated to our support team. Someone will contact you shortly.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub from_faq: bool,
    pub needs_escalation: bool,
}

#[derive(Clone)]
pub struct ChatService {
    pool: DbPool,
    llm: Arc<dyn LlmProvider>,
}

impl ChatService {
    pub fn new(pool: DbPool, llm: Arc<dyn LlmProvider>) -> Self {
        Self { pool, llm }
    }

    fn conn(&self) -> Result<MutexGuard<'_, duckdb::Connection>, ChatError> {
        self.pool
            .lock()
            .map_err(|_| ChatError::Dependency("database connection lock poisoned".to_string()))
    }

    /// Parses an untrusted session id and confirms the session exists.
    fn resolve_session(conn: &duckdb::Connection, raw_id: &str) -> Result<Uuid, ChatError> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return Err(ChatError::Validation("sessionId is required".to_string()));
        }
        let id: Uuid = raw_id
            .parse()
            .map_err(|_| ChatError::Validation(format!("Invalid sessionId: {}", raw_id)))?;

        match DbService::get_session(conn, id)? {
            Some(_) => Ok(id),
            None => Err(ChatError::Validation(format!("Unknown session: {}", id))),
        }
    }

    pub fn create_session(&self) -> Result<Session, ChatError> {
        let conn = self.conn()?;
        let session = DbService::insert_session(&conn)?;
        info!("Created session {}", session.id);
        Ok(session)
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<Message>, ChatError> {
        let conn = self.conn()?;
        let id = Self::resolve_session(&conn, session_id)?;
        Ok(DbService::get_all_messages(&conn, id, SESSION_PAGE)?)
    }

    pub async fn handle_message(&self, session_id: &str, message: &str) -> Result<ChatReply, ChatError> {
        if message.is_empty() {
            return Err(ChatError::Validation("sessionId and message are required".to_string()));
        }

        let (id, history) = {
            let conn = self.conn()?;
            let id = Self::resolve_session(&conn, session_id)?;

            DbService::insert_message(&conn, id, Sender::User, message)?;

            let faqs = DbService::list_faqs(&conn)?;
            if let Some(hit) = faq::find_match(message, &faqs) {
                debug!(faq_id = hit.id, "FAQ match for session {}", id);
                DbService::insert_message(&conn, id, Sender::Bot, &hit.answer)?;
                return Ok(ChatReply {
                    response: hit.answer.clone(),
                    from_faq: true,
                    needs_escalation: false,
                });
            }

            (id, DbService::get_recent_messages(&conn, id, HISTORY_LIMIT)?)
        };

        // The connection lock is released here; the completion call can be slow.
        let prompt = context::build_prompt(&history);
        let options = ChatOptions {
            model: None,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
        };

        let completion = self.llm.chat(&prompt, options).await?;
        match &completion.usage {
            Some(u) => debug!(
                model = %completion.model,
                input = u.input_tokens,
                output = u.output_tokens,
                "completion for session {}", id
            ),
            None => debug!(model = %completion.model, "completion for session {}", id),
        }
        let response = completion
            .content
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        {
            let conn = self.conn()?;
            DbService::insert_message(&conn, id, Sender::Bot, &response)?;
        }

        let needs_escalation = escalation::needs_escalation(&response, message);
        Ok(ChatReply {
            response,
            from_faq: false,
            needs_escalation,
        })
    }

    /// Records a request for human follow-up and returns the confirmation text.
    ///
    /// `user_message` is what the client believes the latest user message was;
    /// when absent the latest stored one is used. A session without any user
    /// message cannot be escalated.
    pub fn escalate(&self, session_id: &str, user_message: Option<&str>) -> Result<String, ChatError> {
        let conn = self.conn()?;
        let id = Self::resolve_session(&conn, session_id)?;

        let history = DbService::get_all_messages(&conn, id, SESSION_PAGE)?;
        let latest = escalation::latest_user_message(&history)
            .ok_or_else(|| ChatError::Validation("No user message to escalate".to_string()))?;

        let text = match user_message.map(str::trim) {
            Some(provided) if !provided.is_empty() => provided,
            _ => latest.content.as_str(),
        };

        let record = DbService::insert_escalation(&conn, id, text)?;
        info!(escalation_id = record.id, "Session {} escalated to a human agent", id);

        Ok(ESCALATION_CONFIRMATION.to_string())
    }
}
