use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "hoax.yaml";

const SAMPLE_CONFIG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/hoax.yaml"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoaxConfig {
    pub version: u32,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_true")]
    pub seed_on_start: bool,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Seconds an unanswered round stays redeemable. `0` never expires rounds.
    #[serde(default = "default_round_ttl_secs")]
    pub round_ttl_secs: u64,
}

impl HoaxConfig {
    pub fn round_ttl(&self) -> Option<Duration> {
        (self.round_ttl_secs > 0).then(|| Duration::from_secs(self.round_ttl_secs))
    }
}

impl Default for HoaxConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            database: default_database(),
            bind: default_bind(),
            seed_on_start: true,
            cookie_name: default_cookie_name(),
            round_ttl_secs: default_round_ttl_secs(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("hoax.db")
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cookie_name() -> String {
    "hoax_session".to_string()
}

fn default_round_ttl_secs() -> u64 {
    24 * 60 * 60
}

pub fn load_config(path: &Path) -> Result<HoaxConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<HoaxConfig, ConfigError> {
    let cfg: HoaxConfig = serde_yaml::from_str(raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.cookie_name.trim().is_empty() {
        return Err(ConfigError("cookie_name must not be empty".into()));
    }
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_or_default(path: &Path) -> Result<HoaxConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        Ok(HoaxConfig::default())
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
