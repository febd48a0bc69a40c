use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli_args::{Cli, ConfigArgs};
use crate::error::{Result, SageError};

/// The closed set of supported text-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAi,
    ModelScope,
    DashScope,
}

impl Provider {
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAi => "openai",
            Provider::ModelScope => "modelscope",
            Provider::DashScope => "dashscope",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "qwen2.5-coder:7b",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::ModelScope => "Qwen/Qwen2.5-Coder-32B-Instruct",
            Provider::DashScope => "qwen-max",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Ollama => "http://localhost:11434",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::ModelScope => "https://api-inference.modelscope.cn/v1",
            Provider::DashScope => {
                "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
            }
        }
    }

    /// Ollama runs locally and needs no credential; every hosted backend
    /// must present one before any network call.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    /// Environment variable consulted for this backend's credential.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Ollama => None,
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::ModelScope => Some("MODELSCOPE_API_KEY"),
            Provider::DashScope => Some("DASHSCOPE_API_KEY"),
        }
    }
}

impl FromStr for Provider {
    type Err = SageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAi),
            "modelscope" => Ok(Provider::ModelScope),
            "dashscope" => Ok(Provider::DashScope),
            other => Err(SageError::Config(format!(
                "unknown provider '{other}' (expected one of: ollama, openai, modelscope, dashscope)"
            ))),
        }
    }
}

/// Canonical response-language representation: a fixed locale code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Zh,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Name used inside prompts when stating the language directive.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Zh => "Chinese (简体中文)",
        }
    }
}

impl FromStr for Language {
    type Err = SageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "zh" | "chinese" => Ok(Language::Zh),
            other => Err(SageError::Config(format!(
                "unknown language '{other}' (expected en or zh)"
            ))),
        }
    }
}

/// Final resolved configuration snapshot for one invocation. The pipeline
/// only ever reads this; nothing writes it back.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub language: Language,
    pub ticket_url: Option<String>,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and
    /// the selected provider's defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--model`, `--api-key`, `--language`)
    ///   2. Env vars (`GSG_MODEL`, the provider's API-key variable)
    ///   3. TOML `~/.config/git-sage.toml`
    ///   4. Provider defaults
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let file_cfg = load_file_config().unwrap_or_default();

        let provider = match file_cfg.provider.as_deref() {
            Some(id) => id.parse()?,
            None => Provider::Ollama,
        };

        let model = cli
            .model
            .clone()
            .or(file_cfg.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let endpoint = file_cfg
            .endpoint
            .unwrap_or_else(|| provider.default_endpoint().to_string());

        let api_key = cli
            .api_key
            .clone()
            .or_else(|| provider.api_key_env().and_then(|var| env::var(var).ok()))
            .or(file_cfg.api_key);

        let language = match cli.language.as_deref().or(file_cfg.language.as_deref()) {
            Some(code) => code.parse()?,
            None => Language::En,
        };

        Ok(Config {
            provider,
            model,
            endpoint,
            api_key,
            temperature: file_cfg.temperature.unwrap_or(0.5),
            language,
            ticket_url: file_cfg.ticket_url,
        })
    }
}

/// On-disk configuration shape; every field optional so partial files
/// work. Unset fields are omitted on save (TOML has no null).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

/// Apply a `gsg config` update to the persisted configuration.
///
/// Switching provider resets model and endpoint to the new backend's
/// documented defaults, so stale cross-backend settings never silently
/// persist. Explicit `--model`/`--endpoint` in the same invocation are
/// applied afterwards and therefore win.
pub fn apply_update(file_cfg: &mut FileConfig, args: &ConfigArgs) -> Result<()> {
    if let Some(id) = &args.provider {
        let provider: Provider = id.parse()?;
        file_cfg.provider = Some(provider.id().to_string());
        file_cfg.model = Some(provider.default_model().to_string());
        file_cfg.endpoint = Some(provider.default_endpoint().to_string());
    }
    if let Some(model) = &args.model {
        file_cfg.model = Some(model.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        file_cfg.endpoint = Some(endpoint.clone());
    }
    if let Some(key) = &args.api_key {
        file_cfg.api_key = Some(key.clone());
    }
    if let Some(code) = &args.language {
        let language: Language = code.parse()?;
        file_cfg.language = Some(language.code().to_string());
    }
    if let Some(url) = &args.ticket_url {
        file_cfg.ticket_url = Some(url.trim_end_matches('/').to_string());
    }
    Ok(())
}

/// Return `~/.config/git-sage.toml`
pub fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("git-sage.toml"))
}

/// Directory holding review prompt rulesets (`common.txt` etc).
pub fn prompts_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SageError::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".config").join("git-sage").join("prompts"))
}

pub fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    toml::from_str::<FileConfig>(&data).ok()
}

pub fn save_file_config(file_cfg: &FileConfig) -> Result<()> {
    let path = config_path()
        .ok_or_else(|| SageError::Config("could not determine home directory".to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SageError::Config(format!("failed to create {parent:?}: {e}")))?;
    }
    let data = toml::to_string_pretty(file_cfg)
        .map_err(|e| SageError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(&path, data).map_err(|e| SageError::Config(format!("failed to write {path:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(provider: Option<&str>, model: Option<&str>, endpoint: Option<&str>) -> ConfigArgs {
        ConfigArgs {
            provider: provider.map(String::from),
            model: model.map(String::from),
            endpoint: endpoint.map(String::from),
            api_key: None,
            language: None,
            ticket_url: None,
        }
    }

    #[test]
    fn switching_provider_resets_model_and_endpoint() {
        let mut cfg = FileConfig {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            endpoint: Some("https://api.openai.com/v1".to_string()),
            ..Default::default()
        };

        apply_update(&mut cfg, &update(Some("ollama"), None, None)).unwrap();

        assert_eq!(cfg.provider.as_deref(), Some("ollama"));
        assert_eq!(cfg.model.as_deref(), Some("qwen2.5-coder:7b"));
        assert_eq!(cfg.endpoint.as_deref(), Some("http://localhost:11434"));
    }

    #[test]
    fn explicit_override_in_same_update_wins_over_reset() {
        let mut cfg = FileConfig {
            provider: Some("ollama".to_string()),
            ..Default::default()
        };

        apply_update(&mut cfg, &update(Some("openai"), Some("gpt-4.1"), None)).unwrap();

        assert_eq!(cfg.provider.as_deref(), Some("openai"));
        assert_eq!(cfg.model.as_deref(), Some("gpt-4.1"));
        // Endpoint was not overridden, so it lands on the new backend's default.
        assert_eq!(cfg.endpoint.as_deref(), Some("https://api.openai.com/v1"));
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let mut cfg = FileConfig::default();
        let err = apply_update(&mut cfg, &update(Some("skynet"), None, None)).unwrap_err();
        assert!(matches!(err, SageError::Config(_)));
        assert!(err.to_string().contains("skynet"));
    }

    #[test]
    fn language_parses_codes_and_names() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("Chinese".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn only_ollama_skips_the_credential() {
        assert!(!Provider::Ollama.requires_api_key());
        assert!(Provider::OpenAi.requires_api_key());
        assert!(Provider::ModelScope.requires_api_key());
        assert!(Provider::DashScope.requires_api_key());
    }
}
