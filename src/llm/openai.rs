use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::llm::{models::{ChatOptions, ChatResponse, Message, Usage}, LlmError, LlmProvider};

/// Client for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
        }
    }
}

/// Builds the chat completions payload. The system prompt, when present, becomes the first turn.
pub(crate) fn request_body(model: &str, messages: &[Message], options: &ChatOptions) -> serde_json::Value {
    let mut final_messages: Vec<Message> = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = &options.system_prompt {
        final_messages.push(Message {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    final_messages.extend_from_slice(messages);

    let mut body = json!({
        "model": model,
        "messages": final_messages,
    });
    if let Some(temperature) = options.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    body
}

/// Pulls the first choice's text out of a completion body. Empty text counts as absent.
pub(crate) fn first_choice_content(body: &serde_json::Value) -> Option<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_usage(body: &serde_json::Value) -> Option<Usage> {
    let u = body.get("usage")?;
    Some(Usage {
        input_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as u32,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);

        let body = request_body(model, messages, &options);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Completion service returned {}: {}", status, text);
            return Err(LlmError::from_status(status));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(ChatResponse {
            content: first_choice_content(&json),
            model: model.to_string(),
            usage: parse_usage(&json),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> Message {
        Message {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn request_body_puts_system_prompt_first() {
        let options = ChatOptions {
            model: None,
            temperature: Some(0.7),
            max_tokens: Some(500),
            system_prompt: Some("be helpful".to_string()),
        };
        let history = vec![turn("user", "hi"), turn("assistant", "hello"), turn("user", "help")];

        let body = request_body("gpt-4o-mini", &history, &options);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 500);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], json!({"role": "system", "content": "be helpful"}));
        assert_eq!(messages[1], json!({"role": "user", "content": "hi"}));
        assert_eq!(messages[3], json!({"role": "user", "content": "help"}));
    }

    #[test]
    fn request_body_omits_unset_options() {
        let body = request_body("m", &[turn("user", "hi")], &ChatOptions::default());
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn extracts_first_choice() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(first_choice_content(&body).as_deref(), Some("first"));
    }

    #[test]
    fn no_choices_yields_none() {
        assert_eq!(first_choice_content(&json!({"choices": []})), None);
        assert_eq!(first_choice_content(&json!({})), None);
        assert_eq!(
            first_choice_content(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
    }

    #[test]
    fn usage_is_optional() {
        assert!(parse_usage(&json!({})).is_none());
        let u = parse_usage(&json!({"usage": {"prompt_tokens": 12, "completion_tokens": 30}})).unwrap();
        assert_eq!(u.input_tokens, 12);
        assert_eq!(u.output_tokens, 30);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let p = OpenAiProvider::new("k".into(), "http://localhost:1234/v1/".into(), "m".into());
        assert_eq!(p.base_url, "http://localhost:1234/v1");
    }
}
