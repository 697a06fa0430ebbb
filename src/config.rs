//! Configuration management for txhistory

use crate::error::{HistoryError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";
pub const API_KEY_PLACEHOLDER: &str = "Enter Etherscan your API key here";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Overrides the transport default when set
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub start_block: u64,
    #[serde(default = "default_end_block")]
    pub end_block: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_secs: None,
            start_block: 0,
            end_block: default_end_block(),
            page_size: default_page_size(),
            sort: default_sort(),
        }
    }
}

impl ApiConfig {
    pub fn has_placeholder_key(&self) -> bool {
        self.api_key.is_empty() || self.api_key == API_KEY_PLACEHOLDER
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// When true an empty normal or internal list discards the whole fetch
    #[serde(default = "default_require_both")]
    pub require_both_categories: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            require_both_categories: default_require_both(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    #[default]
    Grid,
    Utf8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub table_style: TableStyle,
    #[serde(default = "default_chart_width")]
    pub chart_width: u16,
    #[serde(default = "default_chart_height")]
    pub chart_height: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_style: TableStyle::default(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

fn default_api_key() -> String {
    API_KEY_PLACEHOLDER.to_string()
}

fn default_end_block() -> u64 {
    99_999_999
}

fn default_page_size() -> u32 {
    10_000
}

fn default_sort() -> String {
    "asc".to_string()
}

fn default_db_path() -> String {
    "transactions.db".to_string()
}

fn default_require_both() -> bool {
    true
}

fn default_chart_width() -> u16 {
    100
}

fn default_chart_height() -> u16 {
    25
}

impl Config {
    /// Parse a TOML document; missing sections and fields fall back to defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(HistoryError::ConfigError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.page_size == 0 {
            return Err(HistoryError::ConfigError(
                "api.page_size must be greater than zero".to_string(),
            ));
        }
        if self.api.start_block > self.api.end_block {
            return Err(HistoryError::ConfigError(format!(
                "api.start_block ({}) is above api.end_block ({})",
                self.api.start_block, self.api.end_block
            )));
        }
        if self.database.path.trim().is_empty() {
            return Err(HistoryError::ConfigError(
                "database.path must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a command-line database path and re-check the result
    pub fn override_db_path(&mut self, path: Option<String>) -> Result<()> {
        if let Some(path) = path {
            self.database.path = path;
        }
        self.validate()
    }
}

/// Load `path` (or `config.toml` in the working directory), falling back to
/// defaults when the file is absent. The API key env var wins over the file.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let mut config = match fs::read_to_string(path) {
        Ok(contents) => Config::from_toml_str(&contents)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            return Err(HistoryError::ConfigError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.api.api_key = key.trim().to_string();
        }
    }

    Ok(config)
}
