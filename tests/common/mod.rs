#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use supportdesk::chat::ChatService;
use supportdesk::config::DatabaseConfig;
use supportdesk::db::{get_connection, service::DbService, DbPool};
use supportdesk::llm::models::{ChatOptions, ChatResponse, Message};
use supportdesk::llm::{LlmError, LlmProvider};

pub enum Scripted {
    Reply(Option<String>),
    Status(StatusCode),
}

/// Completion provider that returns a fixed outcome and records what it was sent.
pub struct ScriptedProvider {
    outcome: Scripted,
    calls: AtomicUsize,
    last_prompt: Mutex<Vec<Message>>,
    last_options: Mutex<Option<ChatOptions>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Scripted::Reply(Some(text.to_string())))
    }

    pub fn with(outcome: Scripted) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Vec<Message> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<ChatOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = messages.to_vec();
        *self.last_options.lock().unwrap() = Some(options);

        match &self.outcome {
            Scripted::Reply(content) => Ok(ChatResponse {
                content: content.clone(),
                model: "scripted-model".to_string(),
                usage: None,
            }),
            Scripted::Status(status) => Err(LlmError::from_status(*status)),
        }
    }
}

pub fn memory_pool() -> DbPool {
    get_connection(&DatabaseConfig {
        path: ":memory:".to_string(),
    })
    .unwrap()
}

pub fn service_with(provider: Arc<ScriptedProvider>) -> (ChatService, DbPool) {
    let pool = memory_pool();
    (ChatService::new(pool.clone(), provider), pool)
}

pub fn seed_faq(pool: &DbPool, question: &str, answer: &str) {
    let conn = pool.lock().unwrap();
    DbService::insert_faq(&conn, question, answer).unwrap();
}
