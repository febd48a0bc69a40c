use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LlmClient;
use crate::error::{Result, SageError};

/// Minimal request/response structs for the OpenAI Chat Completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Client for any backend speaking the OpenAI chat wire format (OpenAI
/// itself and ModelScope's inference API).
pub struct OpenAiClient {
    backend: &'static str,
    client: Client,
    api_key: String,
    model: String,
    api_base_url: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        backend: &'static str,
        api_key: String,
        model: &str,
        api_base_url: &str,
        temperature: f32,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        OpenAiClient {
            backend,
            client,
            api_key,
            model: model.to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            temperature,
        }
    }

    fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }
}

impl LlmClient for OpenAiClient {
    fn send(&self, instruction: &str) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: instruction.to_string(),
            }],
            temperature: self.temperature,
            stream: false,
        };

        let url = self.chat_url();
        log::info!("Calling {} model {:?}", self.backend, req.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .map_err(|e| {
                SageError::provider(self.backend, "chat", format!("failed to send request: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(SageError::provider(
                self.backend,
                "chat",
                format!("HTTP {} - {}", status.as_u16(), text.trim()),
            ));
        }

        let chat_resp: ChatResponse = resp.json().map_err(|e| {
            SageError::provider(self.backend, "chat", format!("failed to parse response: {e}"))
        })?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let content = chat_resp
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| SageError::provider(self.backend, "chat", "no choices returned"))?;

        Ok(content)
    }
}
