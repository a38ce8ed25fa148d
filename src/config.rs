use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, ScraperError};

/// Runtime configuration, loaded from a TOML file with per-field defaults so a
/// partial (or absent) config file still yields a usable run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hub; overridable for tests and mirrors.
    pub api_base_url: String,
    /// Upper bound on the number of spaces processed per run.
    pub max_items: usize,
    /// Page size requested from the directory listing.
    pub page_size: usize,
    /// Where the parquet output lands.
    pub output_path: String,
    pub timeout_seconds: u64,
    /// Pause between detail lookups, in milliseconds. 0 disables pacing.
    pub delay_ms: u64,
    /// When true, a failed detail lookup is logged and skipped instead of
    /// aborting the whole run.
    pub skip_failed_lookups: bool,
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    /// Hub dataset the output file gets pushed to, e.g. "user/spaces-stats".
    pub dataset_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://huggingface.co".to_string(),
            max_items: 500,
            page_size: 100,
            output_path: "spaces.parquet".to_string(),
            timeout_seconds: 30,
            delay_ms: 0,
            skip_failed_lookups: false,
            publish: PublishConfig::default(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dataset_id: String::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
