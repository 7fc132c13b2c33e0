use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::prompt::PromptInputs;

pub const CONFIG_FILE_NAME: &str = "promptalpha.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identifier stored with saved prompts, feedback and usage counters.
    #[serde(default = "default_user")]
    pub user: String,
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub usage: UsageConfig,
    /// Starting values for every prompt assembled in a session.
    #[serde(default)]
    pub defaults: PromptInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>, // For OpenAI-compatible APIs and proxies

    /// Optional: Override max_tokens for LLM requests
    /// If not specified, uses provider-specific defaults:
    /// - anthropic: 4096
    /// - openai: 4096
    /// - openai-compatible: 8192
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Get max_tokens value, using provider-specific default if not specified
    pub fn get_max_tokens(&self) -> u32 {
        if let Some(tokens) = self.max_tokens {
            return tokens;
        }

        match self.provider.as_str() {
            "anthropic" => 4096,
            "openai" => 4096,
            "openai-compatible" => 8192,
            _ => 4096,
        }
    }

    /// Base URL for the provider, falling back to its public endpoint.
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        match self.provider.as_str() {
            "anthropic" => "https://api.anthropic.com/v1".to_string(),
            "openai-compatible" => "http://localhost:11434/v1".to_string(),
            _ => "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON store location (default: <data_dir>/promptalpha/store.json)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Prefix for share links, e.g. "https://promptalpha.app/s"
    #[serde(default)]
    pub share_base_url: Option<String>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("promptalpha"))
            .unwrap_or_else(|| PathBuf::from(".promptalpha"))
            .join("store.json")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Daily "enhance" calls per user; 0 disables the limit (default: 10)
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            daily_quota: default_daily_quota(),
        }
    }
}

fn default_user() -> String {
    "anonymous".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_daily_quota() -> u32 {
    10
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("failed to load config from {}", config_path));
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_path(local) {
                Ok(config) => {
                    debug!("Loaded config from ./{}", CONFIG_FILE_NAME);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring ./{}: {:#}", CONFIG_FILE_NAME, e),
            }
        }

        if let Some(config_path) = Self::user_config_path() {
            if config_path.exists() {
                match Self::load_from_path(&config_path) {
                    Ok(config) => {
                        debug!("Loaded config from {:?}", config_path);
                        return Ok(config);
                    }
                    Err(e) => warn!("Ignoring {:?}: {:#}", config_path, e),
                }
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("promptalpha").join("config.toml"))
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get API key from environment variable specified in config
    pub fn get_api_key(&self) -> Result<String> {
        match &self.llm.api_key_env {
            Some(env_var) => {
                // "none" means no API key needed (local models)
                if env_var.eq_ignore_ascii_case("none") {
                    return Ok(String::new());
                }

                // openai-compatible gateways may or may not need a key
                if self.llm.provider == "openai-compatible" {
                    return Ok(env::var(env_var).unwrap_or_default());
                }

                env::var(env_var).map_err(|_| {
                    anyhow::anyhow!("API key not found in environment variable: {}", env_var)
                })
            }
            None => Ok(String::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: default_user(),
            llm: LlmConfig {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key_env: Some("OPENAI_API_KEY".to_string()),
                base_url: None,
                max_tokens: None,
                timeout_secs: default_timeout_secs(),
            },
            store: StoreConfig::default(),
            usage: UsageConfig::default(),
            defaults: PromptInputs::default(),
        }
    }
}
