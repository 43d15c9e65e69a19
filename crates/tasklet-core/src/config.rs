//! Application configuration module
//!
//! Provides configuration management with TOML file support,
//! environment variable integration, and sensible defaults.
//!
//! The `[sync]` section is resolved once at startup into a [`SyncConfig`],
//! which is installed process-wide and never changes afterwards.

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Sync and authentication settings as written in config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub anonymous_auth_enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_local_db_name")]
    pub local_db_name: String,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

// Default value functions for serde
fn default_app_id() -> String {
    "<Your App ID>".to_string()
}

fn default_base_url() -> String {
    "https://services.cloud.mongodb.com".to_string()
}

fn default_base_url_env() -> String {
    "TASKLET_BASE_URL".to_string()
}

fn default_local_db_name() -> String {
    "tasks.db".to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            enabled: false,
            app_id: default_app_id(),
            anonymous_auth_enabled: false,
            base_url: default_base_url(),
            base_url_env: default_base_url_env(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            local_db_name: default_local_db_name(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            date_format: default_date_format(),
        }
    }
}

/// Which of the two application flows is active.
///
/// Sync is an optional feature layered over the same task store, so the
/// configuration is a tagged variant rather than a set of loose flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncConfig {
    /// Local-only: no login screen, tasks have no owner.
    Disabled,
    /// Authenticate against the application backend and bind the store to
    /// the signed-in user's partition.
    Enabled {
        app_id: String,
        base_url: String,
        anonymous_auth_enabled: bool,
    },
}

static SYNC_CONFIG: OnceLock<SyncConfig> = OnceLock::new();

impl SyncConfig {
    /// Install the process-wide sync configuration.
    ///
    /// Only the first call has an effect; later calls return the value that
    /// is already installed.
    pub fn install(config: SyncConfig) -> &'static SyncConfig {
        let installed = SYNC_CONFIG.get_or_init(|| config.clone());
        if *installed != config {
            tracing::warn!("sync configuration already installed, ignoring new value");
        }
        installed
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SyncConfig::Enabled { .. })
    }

    pub fn anonymous_auth_enabled(&self) -> bool {
        matches!(
            self,
            SyncConfig::Enabled {
                anonymous_auth_enabled: true,
                ..
            }
        )
    }
}

impl Config {
    /// Returns the configuration directory path (~/.config/tasklet/)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("tasklet");
        Ok(config_dir)
    }

    /// Returns the configuration file path (~/.config/tasklet/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the local database path (~/.config/tasklet/tasks.db)
    ///
    /// # Errors
    ///
    /// Returns an error if the database name contains path traversal sequences.
    pub fn local_db_path(&self) -> Result<PathBuf> {
        let db_name = &self.database.local_db_name;

        // Reject path traversal attempts
        if db_name.contains("..") || db_name.contains('/') || db_name.contains('\\') {
            anyhow::bail!(
                "Invalid database name '{}': must be a simple filename without path separators",
                db_name
            );
        }

        Ok(Self::config_dir()?.join(db_name))
    }

    /// Returns the display date format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format contains an unknown strftime specifier.
    pub fn date_format(&self) -> Result<&str> {
        let format = &self.display.date_format;
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!(
                "Invalid date_format '{}' under [display]: not a valid strftime format",
                format
            );
        }
        Ok(format)
    }

    /// Returns the persisted session path (~/.config/tasklet/session.json)
    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.json"))
    }

    /// Returns the TUI log file path (~/.config/tasklet/tasklet.log)
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("tasklet.log"))
    }

    /// Load configuration from file, or return default if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file, creating the directory if needed.
    ///
    /// On Unix systems, the config file is created with mode 0600 (owner read/write only).
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        let config_path = Self::config_path()?;

        ensure_private_dir(&config_dir)?;

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(&config_path, &content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        #[cfg(unix)]
        {
            let file_perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&config_path, file_perms)
                .with_context(|| format!("Failed to set permissions on config file: {}", config_path.display()))?;
        }

        Ok(())
    }

    /// Backend base URL, taking the override environment variable into account.
    pub fn base_url(&self) -> String {
        env::var(&self.sync.base_url_env)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.sync.base_url.clone())
    }

    /// Resolve the `[sync]` section into a [`SyncConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if sync is enabled without a real application id.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        if !self.sync.enabled {
            return Ok(SyncConfig::Disabled);
        }

        let app_id = self.sync.app_id.trim();
        if app_id.is_empty() || app_id == default_app_id() {
            anyhow::bail!(
                "Sync is enabled but no application id is set. Add `app_id = \"...\"` under [sync] in {}",
                Self::config_path()?.display()
            );
        }

        Ok(SyncConfig::Enabled {
            app_id: app_id.to_string(),
            base_url: self.base_url(),
            anonymous_auth_enabled: self.sync.anonymous_auth_enabled,
        })
    }
}

/// Create `dir` if missing, restricted to the owner on Unix.
pub(crate) fn ensure_private_dir(dir: &std::path::Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        #[cfg(unix)]
        {
            let dir_perms = std::fs::Permissions::from_mode(0o700);
            fs::set_permissions(dir, dir_perms)
                .with_context(|| format!("Failed to set permissions on config directory: {}", dir.display()))?;
        }
    }
    Ok(())
}
