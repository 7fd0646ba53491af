// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::warn;

pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";
pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_daily_limit() -> u32 {
    20
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_body_chars() -> usize {
    400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Real judge calls allowed per UTC day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Review bodies are truncated to this many chars in the prompt.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            daily_limit: default_daily_limit(),
            api_key: default_api_key(),
            model: default_model(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let mut cfg: AiConfig = serde_json::from_str(data)?;

        // Normalize provider
        cfg.provider = cfg.provider.trim().to_lowercase();

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => {
                    if cfg.enabled {
                        env::var("OPENAI_API_KEY")
                            .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?
                    } else {
                        env::var("OPENAI_API_KEY").unwrap_or_default()
                    }
                }
                "mock" => String::new(),
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if cfg.max_body_chars == 0 {
            cfg.max_body_chars = default_max_body_chars();
        }

        Ok(cfg)
    }

    /// $AI_CONFIG_PATH, then config/ai.json. Missing or broken file → AI disabled.
    pub fn load_or_default() -> Self {
        let path = env::var(ENV_AI_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_AI_CONFIG_PATH.into());
        if !Path::new(&path).exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(
                    target: "radar::config",
                    error = %e,
                    %path,
                    "AI config unusable; judge disabled"
                );
                Self::default()
            }
        }
    }
}
