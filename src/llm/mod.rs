pub mod models;
pub mod openai;

use openai::OpenAiProvider;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::ChatError;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,
    #[error("AI service payment required. Please contact support.")]
    QuotaExceeded,
    #[error("AI service error: {status}")]
    Api { status: u16 },
}

impl LlmError {
    /// Maps a non-success status from the completion service to its error kind.
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            LlmError::RateLimited
        } else if status == StatusCode::PAYMENT_REQUIRED {
            LlmError::QuotaExceeded
        } else {
            LlmError::Api {
                status: status.as_u16(),
            }
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError>;
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, ChatError> {
        let cfg = &config.llm;
        if cfg.api_key.trim().is_empty() {
            return Err(ChatError::Configuration(
                "LLM API key is not configured".to_string(),
            ));
        }

        Ok(Arc::new(OpenAiProvider::new(
            cfg.api_key.clone(),
            cfg.api_base.clone(),
            cfg.model.clone(),
        )))
    }
}
