use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KeepsakeConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Where the three JSON documents live.
///
/// `base` is either a directory on disk or an `http(s)://` URL; the file
/// names are joined onto it.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub base: String,
    pub memories: String,
    pub image_metadata: String,
    pub image_blobs: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub page_size: usize,
    pub image_wait_timeout_ms: u64,
    pub highlight_keywords: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8787,
            log_level: "info".into(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base: "./data".into(),
            memories: "memories.json".into(),
            image_metadata: "image_metadata.json".into(),
            image_blobs: "images.json".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_size: 3,
            image_wait_timeout_ms: 45_000,
            highlight_keywords: vec!["high".into(), "milestone".into(), "special".into()],
        }
    }
}

impl DataConfig {
    /// True when `base` points at an HTTP server rather than a directory.
    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl CacheConfig {
    pub fn image_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.image_wait_timeout_ms)
    }
}

/// Returns `~/.keepsake/`
pub fn default_keepsake_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".keepsake")
}

/// Returns the default config file path: `~/.keepsake/config.toml`
pub fn default_config_path() -> PathBuf {
    default_keepsake_dir().join("config.toml")
}

impl KeepsakeConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            KeepsakeConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (KEEPSAKE_DATA, KEEPSAKE_PAGE_SIZE, KEEPSAKE_LOG_LEVEL).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("KEEPSAKE_DATA") {
            self.data.base = val;
        }
        if let Ok(val) = std::env::var("KEEPSAKE_PAGE_SIZE") {
            self.cache.page_size = val
                .parse()
                .with_context(|| format!("KEEPSAKE_PAGE_SIZE is not a number: {val}"))?;
        }
        if let Ok(val) = std::env::var("KEEPSAKE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.cache.page_size > 0, "cache.page_size must be at least 1");
        Ok(())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
