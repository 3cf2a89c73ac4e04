use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::api::DEFAULT_TIMEOUT;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const API_BASE_URL_ENV: &str = "MEDASSIST_API_BASE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Base URL of the backend: environment first, then the config file,
    /// then the local default.
    pub fn api_base_url(&self) -> String {
        Self::resolve_base_url(std::env::var(API_BASE_URL_ENV).ok(), self.api_base_url.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn resolve_base_url(from_env: Option<String>, from_file: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or(from_file.filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("medassist"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
