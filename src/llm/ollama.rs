use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;
use std::time::Duration;

use super::LlmClient;
use crate::error::{Result, SageError};

const BACKEND: &str = "ollama";

#[derive(Debug, Encode)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Encode)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Encode)]
struct ChatRequest {
    model: String,
    stream: bool,
    options: ChatOptions,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Decode)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Decode)]
struct ChatResponse {
    message: ResponseMessage,
}

/// Synchronous Ollama client using /api/chat. Local backend; no credential.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, temperature: f32) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        }
    }
}

impl LlmClient for OllamaClient {
    fn send(&self, instruction: &str) -> Result<String> {
        let req_body = ChatRequest {
            model: self.model.clone(),
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: instruction.to_string(),
            }],
        };

        let body_str = json::to_string(&req_body).map_err(|e| {
            SageError::provider(BACKEND, "chat", format!("failed to encode request: {e}"))
        })?;

        let url = format!("{}/api/chat", self.base_url);
        log::info!("Calling Ollama model {:?}", self.model);
        log::trace!("Ollama request body: {body_str}");

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| SageError::provider(BACKEND, "chat", format!("error calling {url}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(SageError::provider(
                BACKEND,
                "chat",
                format!("HTTP {} from {url}: {}", status.as_u16(), text.trim()),
            ));
        }

        let resp_text = resp.text().map_err(|e| {
            SageError::provider(BACKEND, "chat", format!("failed to read response body: {e}"))
        })?;

        log::trace!("Ollama raw JSON response: {resp_text}");

        let parsed: ChatResponse = json::from_str(&resp_text).map_err(|e| {
            SageError::provider(BACKEND, "chat", format!("failed to decode response: {e}"))
        })?;

        Ok(parsed.message.content.trim().to_string())
    }
}
