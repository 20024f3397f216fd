//! Application configuration
//!
//! Every section has working defaults. A YAML file may override any subset
//! of fields, and API keys/URLs can be supplied through the environment so
//! they never need to live in the file.

use crate::affinity::AffinityThresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tastegraph_layout::LayoutConfig;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Text-generation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LLMProvider {
    OpenAI,
    Ollama,
    Gemini,
}

impl LLMProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(LLMProvider::OpenAI),
            "ollama" => Some(LLMProvider::Ollama),
            "gemini" => Some(LLMProvider::Gemini),
            _ => None,
        }
    }

    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Ollama => "http://localhost:11434",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

/// Cultural-graph API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultureApiConfig {
    pub base_url: String,
    /// Sent as `X-Api-Key`
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Recent searches kept in memory
    pub search_cache_size: usize,
    /// Quiet period before a search-as-you-type query is sent
    pub search_debounce_ms: u64,
}

impl Default for CultureApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.qloo.com".to_string(),
            api_key: None,
            timeout_secs: 15,
            search_cache_size: 64,
            search_debounce_ms: 300,
        }
    }
}

/// Text-generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: LLMProvider,
    /// Model name (e.g., "gemini-1.5-flash", "llama3")
    pub model: String,
    /// API key (not needed for Ollama)
    pub api_key: Option<String>,
    /// Overrides the provider's default base URL
    pub api_base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            api_base_url: None,
            system_prompt: None,
            temperature: 0.8,
            timeout_secs: 60,
        }
    }
}

/// Session storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RocksDB directory; None keeps the session in memory
    pub data_path: Option<String>,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub culture: CultureApiConfig,
    pub generation: GenerationConfig,
    pub affinity: AffinityThresholds,
    pub layout: LayoutConfig,
    pub session: SessionConfig,
    /// Seed for the graph builder's cosmetic jitter
    pub graph_seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            culture: CultureApiConfig::default(),
            generation: GenerationConfig::default(),
            affinity: AffinityThresholds::default(),
            layout: LayoutConfig::default(),
            session: SessionConfig::default(),
            graph_seed: 2024,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document; absent fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `TASTEGRAPH_*` variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TASTEGRAPH_CULTURE_API_URL") {
            self.culture.base_url = v;
        }
        if let Some(v) = get("TASTEGRAPH_CULTURE_API_KEY") {
            self.culture.api_key = Some(v);
        }
        if let Some(p) = get("TASTEGRAPH_LLM_PROVIDER").and_then(|v| LLMProvider::parse(&v)) {
            self.generation.provider = p;
        }
        if let Some(v) = get("TASTEGRAPH_LLM_MODEL") {
            self.generation.model = v;
        }
        if let Some(v) = get("TASTEGRAPH_LLM_API_KEY") {
            self.generation.api_key = Some(v);
        }
        if let Some(v) = get("TASTEGRAPH_LLM_API_URL") {
            self.generation.api_base_url = Some(v);
        }
        if let Some(v) = get("TASTEGRAPH_DATA_PATH") {
            self.session.data_path = Some(v);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.culture.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("culture.base_url is empty".to_string()));
        }
        if self.culture.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        if self.affinity.overlap_scale <= 0.0 {
            return Err(ConfigError::Invalid("affinity.overlap_scale must be positive".to_string()));
        }
        if self.layout.width <= 0.0 || self.layout.height <= 0.0 {
            return Err(ConfigError::Invalid("layout canvas must have a positive size".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
culture:
  api_key: "abc"
  timeout_secs: 5
affinity:
  overlap_scale: 150.0
layout:
  charge: -120.0
"#,
        )
        .unwrap();

        assert_eq!(config.culture.api_key.as_deref(), Some("abc"));
        assert_eq!(config.culture.timeout_secs, 5);
        assert_eq!(config.culture.search_debounce_ms, 300);
        assert_eq!(config.affinity.overlap_scale, 150.0);
        assert_eq!(config.affinity.common_limit, 15);
        assert_eq!(config.layout.charge, -120.0);
        assert_eq!(config.layout.link_strength_scale, 0.8);
        assert_eq!(config.generation.provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_yaml_str("culture:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_yaml_str("culture: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TASTEGRAPH_CULTURE_API_KEY", "k1"),
            ("TASTEGRAPH_LLM_PROVIDER", "ollama"),
            ("TASTEGRAPH_LLM_MODEL", "llama3"),
            ("TASTEGRAPH_DATA_PATH", "/tmp/tg"),
            ("TASTEGRAPH_LLM_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.culture.api_key.as_deref(), Some("k1"));
        assert_eq!(config.generation.provider, LLMProvider::Ollama);
        assert_eq!(config.generation.model, "llama3");
        assert_eq!(config.session.data_path.as_deref(), Some("/tmp/tg"));
        assert_eq!(config.generation.api_key, None);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LLMProvider::parse("OpenAI"), Some(LLMProvider::OpenAI));
        assert_eq!(LLMProvider::parse("bard"), None);
    }
}
