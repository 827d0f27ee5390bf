use serde::Deserialize;
use std::fs;

use crate::constants::{MAPBOX_FORWARD_URL, USASPENDING_BASE_URL};
use crate::error::{Result, ScraperError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub collector: CollectorConfig,
    #[serde(default)]
    pub usaspending: UsaSpendingConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    pub keywords: Vec<String>,
    pub projects_per_keyword: usize,
    /// Gate detail fetching on the relevance filter. Off by default: the
    /// main collection path takes the top-N raw search results as-is.
    #[serde(default)]
    pub apply_relevance_filter: bool,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsaSpendingConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub requests_per_min: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub requests_per_min: u64,
}

impl Default for UsaSpendingConfig {
    fn default() -> Self {
        Self {
            base_url: USASPENDING_BASE_URL.to_string(),
            timeout_seconds: 30,
            requests_per_min: 60,
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: MAPBOX_FORWARD_URL.to_string(),
            timeout_seconds: 30,
            requests_per_min: 120,
        }
    }
}

fn default_output_file() -> String {
    "projects_ready_for_db.json".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;
        if config.collector.keywords.is_empty() {
            return Err(ScraperError::Config(
                "collector.keywords must list at least one keyword".to_string(),
            ));
        }
        Ok(config)
    }

    /// The Mapbox credential is deliberately not part of config.toml; it
    /// comes from the environment (or a .env file) and aborts the run with
    /// a clear diagnostic when missing.
    pub fn mapbox_token() -> Result<String> {
        std::env::var("MAPBOX_TOKEN").map_err(|_| {
            ScraperError::Config(
                "MAPBOX_TOKEN is not set; export it or add it to a .env file".to_string(),
            )
        })
    }
}
