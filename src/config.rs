use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    api: ApiConfig,
    storage: StorageConfig,
    #[serde(default)]
    user: UserConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiConfig {
    url: String,
    #[serde(default = "default_timeout")]
    timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct StorageConfig {
    data_dir: String,
    #[serde(default = "default_downloads_dir")]
    downloads_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UserConfig {
    #[serde(default = "default_display_name")]
    display_name: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_downloads_dir() -> String {
    "downloads".to_string()
}

fn default_display_name() -> String {
    "Health Assistant User".to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_timeout: u64,
    pub data_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub display_name: String,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;

        Ok(Self {
            api_url: config_file.api.url,
            api_timeout: config_file.api.timeout,
            data_dir: config_file.storage.data_dir.into(),
            downloads_dir: config_file.storage.downloads_dir.into(),
            display_name: config_file.user.display_name,
        })
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(&content)
    }

    pub fn load() -> Result<Self> {
        let path =
            std::env::var("HEALTHDESK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_file(&path)
    }
}
