//! Configuration: accounts file, app config, and default state paths.
//!
//! The accounts file is a fixed external contract (ordered JSON records of
//! `{id, name}`). The app config is an optional TOML file under the XDG
//! config dir, created with defaults on first use.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One upstream content owner to archive. Supplied externally, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Numeric user id on the upstream platform. Accounts files in the wild
    /// carry it as either a JSON number or a string.
    #[serde(deserialize_with = "id_string_or_number")]
    pub id: String,
    pub name: String,
}

fn id_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(u64),
        Str(String),
    }
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Str(s) => s,
    })
}

/// Loads the ordered account list from a JSON file.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>> {
    let bytes = fs::read(path).with_context(|| format!("read accounts file: {}", path.display()))?;
    let accounts: Vec<Account> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse accounts file: {}", path.display()))?;
    Ok(accounts)
}

/// Webhook notification settings (bearer-authenticated POST per stored page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    pub token: String,
}

/// Global configuration loaded from `~/.config/pixarc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixarcConfig {
    /// Connect timeout for API requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Total time budget for one API request, in seconds.
    pub api_timeout_secs: u64,
    /// Total time budget for one page download, in seconds.
    pub page_timeout_secs: u64,
    /// Optional storage root; defaults to `Storage` under the working dir.
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
    /// Optional upstream base URL override (primarily for testing).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Optional webhook notified after each stored page.
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

impl Default for PixarcConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            api_timeout_secs: 30,
            page_timeout_secs: 100,
            storage_root: None,
            base_url: None,
            webhook: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pixarc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PixarcConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PixarcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PixarcConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Default completed-works ledger file: `~/.local/state/pixarc/cache.json`.
pub fn default_cache_path() -> Result<PathBuf> {
    state_file("cache.json")
}

/// Default corrupted-works ledger file: `~/.local/state/pixarc/corrupted.json`.
///
/// Unlike the cache, this file must exist (even as `[]`) before a run.
pub fn default_corrupted_path() -> Result<PathBuf> {
    state_file("corrupted.json")
}

fn state_file(name: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pixarc")?;
    Ok(xdg_dirs.get_state_home().join("pixarc").join(name))
}

/// Default storage root: `Storage` under the current working directory.
pub fn default_storage_root() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join("Storage"))
}
