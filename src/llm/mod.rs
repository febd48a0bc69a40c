pub mod dashscope;
pub mod ollama;
pub mod openai;
pub mod prompt_builder;
pub mod prompts;

use crate::config::{Config, Provider};
use crate::error::{Result, SageError};

use dashscope::DashScopeClient;
use ollama::OllamaClient;
use openai::OpenAiClient;

/// One uniform operation over every backend: send the compiled
/// instruction, receive raw text. Single-shot, non-streaming, no retry.
pub trait LlmClient {
    fn send(&self, instruction: &str) -> Result<String>;
}

/// Resolve the configured backend to a concrete client.
///
/// The provider set is closed; hosted backends fail here, before any
/// network call, when no credential is configured.
pub fn build_client(cfg: &Config) -> Result<Box<dyn LlmClient>> {
    let api_key = if cfg.provider.requires_api_key() {
        require_api_key(cfg)?
    } else {
        String::new()
    };

    match cfg.provider {
        Provider::Ollama => Ok(Box::new(OllamaClient::new(
            &cfg.endpoint,
            &cfg.model,
            cfg.temperature,
        ))),
        Provider::OpenAi => Ok(Box::new(OpenAiClient::new(
            "openai",
            api_key,
            &cfg.model,
            &cfg.endpoint,
            cfg.temperature,
        ))),
        // ModelScope's inference API speaks the OpenAI chat wire format.
        Provider::ModelScope => Ok(Box::new(OpenAiClient::new(
            "modelscope",
            api_key,
            &cfg.model,
            &cfg.endpoint,
            cfg.temperature,
        ))),
        Provider::DashScope => Ok(Box::new(DashScopeClient::new(
            api_key,
            &cfg.model,
            &cfg.endpoint,
            cfg.temperature,
        ))),
    }
}

fn require_api_key(cfg: &Config) -> Result<String> {
    match cfg.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => Err(SageError::Config(format!(
            "provider '{}' requires an API key; set {} or run `gsg config --api-key <key>`",
            cfg.provider.id(),
            cfg.provider.api_key_env().unwrap_or("an API key"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;

    fn cfg(provider: Provider, api_key: Option<&str>) -> Config {
        Config {
            provider,
            model: provider.default_model().to_string(),
            endpoint: provider.default_endpoint().to_string(),
            api_key: api_key.map(String::from),
            temperature: 0.5,
            language: Language::En,
            ticket_url: None,
        }
    }

    #[test]
    fn hosted_provider_without_key_fails_before_any_network_call() {
        for provider in [Provider::OpenAi, Provider::ModelScope, Provider::DashScope] {
            let err = build_client(&cfg(provider, None)).err().unwrap();
            assert!(matches!(err, SageError::Config(_)));
            assert!(err.to_string().contains(provider.id()));
        }
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = build_client(&cfg(Provider::OpenAi, Some("  "))).err().unwrap();
        assert!(matches!(err, SageError::Config(_)));
    }

    #[test]
    fn ollama_needs_no_key() {
        assert!(build_client(&cfg(Provider::Ollama, None)).is_ok());
    }
}
