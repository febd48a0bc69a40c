use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LlmClient;
use crate::error::{Result, SageError};

const BACKEND: &str = "dashscope";

/// DashScope text-generation envelope: messages nested under `input`,
/// sampling knobs under `parameters`.
#[derive(Serialize)]
struct GenerationRequest {
    model: String,
    input: GenerationInput,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput {
    messages: Vec<GenerationMessage>,
}

#[derive(Serialize)]
struct GenerationMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct GenerationParameters {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
    message: Option<String>,
    code: Option<String>,
}

#[derive(Deserialize)]
struct GenerationOutput {
    text: String,
}

/// Client for the DashScope generation API (qwen-* hosted models).
pub struct DashScopeClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
}

impl DashScopeClient {
    pub fn new(api_key: String, model: &str, endpoint: &str, temperature: f32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        DashScopeClient {
            client,
            api_key,
            model: model.to_string(),
            endpoint: endpoint.to_string(),
            temperature,
        }
    }
}

impl LlmClient for DashScopeClient {
    fn send(&self, instruction: &str) -> Result<String> {
        let req = GenerationRequest {
            model: self.model.clone(),
            input: GenerationInput {
                messages: vec![GenerationMessage {
                    role: "user".to_string(),
                    content: instruction.to_string(),
                }],
            },
            parameters: GenerationParameters {
                temperature: self.temperature,
            },
        };

        log::info!("Calling DashScope model {:?}", req.model);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .map_err(|e| {
                SageError::provider(BACKEND, "generation", format!("failed to send request: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(SageError::provider(
                BACKEND,
                "generation",
                format!("HTTP {} - {}", status.as_u16(), text.trim()),
            ));
        }

        let parsed: GenerationResponse = resp.json().map_err(|e| {
            SageError::provider(BACKEND, "generation", format!("failed to parse response: {e}"))
        })?;

        match parsed.output {
            Some(output) => Ok(output.text.trim().to_string()),
            None => {
                let code = parsed.code.unwrap_or_default();
                let message = parsed.message.unwrap_or_else(|| "unknown error".to_string());
                Err(SageError::provider(
                    BACKEND,
                    "generation",
                    format!("API error {code}: {message}"),
                ))
            }
        }
    }
}
