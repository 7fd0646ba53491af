// src/config/radar.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RADAR_CONFIG_PATH: &str = "config/radar.toml";
pub const ENV_RADAR_CONFIG_PATH: &str = "RADAR_CONFIG_PATH";

/// Service settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reports older than this are recomputed.
    pub ttl_secs: u64,
    /// Max cached products; the oldest entry goes first.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            capacity: 512,
        }
    }
}

impl RadarConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RadarConfig = toml::from_str(s).context("parsing radar config")?;
        if cfg.cache.capacity == 0 {
            cfg.cache.capacity = 1;
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading radar config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallback:
    /// 1) $RADAR_CONFIG_PATH (must exist)
    /// 2) config/radar.toml (optional, defaults when absent)
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_RADAR_CONFIG_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_RADAR_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::default())
    }
}
