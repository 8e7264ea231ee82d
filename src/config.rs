use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::filter::DEFAULT_EXTENSIONS;
use crate::debrid::realdebrid::{DebridContext, DEFAULT_BASE_URL, DEFAULT_CATALOG_LIMIT};

pub const TOKEN_ENV: &str = "RD_API_TOKEN";

/// Settings loaded from `~/.config/magnet-debrid/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bearer token for the debrid API. Empty means "not configured".
    pub api_token: String,
    pub base_url: String,
    /// File extensions (without the dot) selected after a magnet is added.
    pub allowed_extensions: Vec<String>,
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How long a notification stays on screen.
    pub notify_secs: u64,
    /// `limit` for the torrent listing. The service returns only its own small
    /// default page without it, which hides older torrents from the duplicate check.
    pub catalog_limit: Option<u32>,
    pub locale: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            user_agent: concat!("magnet-debrid/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 60,
            notify_secs: 3,
            catalog_limit: Some(DEFAULT_CATALOG_LIMIT),
            locale: "en".to_string(),
        }
    }
}

impl AppConfig {
    pub fn debrid_context(&self) -> Result<DebridContext> {
        if self.api_token.trim().is_empty() {
            anyhow::bail!(
                "no api token configured (set api_token in the config file, {} or --token)",
                TOKEN_ENV
            );
        }
        Ok(DebridContext {
            base_url: self.base_url.clone(),
            api_token: self.api_token.trim().to_string(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_secs,
            catalog_limit: self.catalog_limit,
        })
    }

    pub fn has_token(&self) -> bool {
        !self.api_token.trim().is_empty()
    }

    /// Environment overrides applied on top of the file.
    pub fn apply_env(&mut self, token: Option<String>) {
        if let Some(t) = token.filter(|t| !t.trim().is_empty()) {
            self.api_token = t;
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("magnet-debrid")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
