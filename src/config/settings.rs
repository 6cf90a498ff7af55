//! Application settings loaded from `config.toml`.
//!
//! Every field has a default so a missing file still yields a usable configuration.
//! Secrets never live here; they come from the environment (see [`crate::config::database`]
//! and [`crate::google::Credentials::from_env`]).

use crate::core::{paginator, pool_finder};
use crate::errors::{Error, Result};
use crate::google;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_VAR: &str = "SOLO_LEDGER_CONFIG";
/// Config file read when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Discord allows at most 25 fields per embed.
pub const MAX_PAGE_SIZE: usize = 25;

/// Whole `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for text commands
    pub prefix: String,
    /// Paginated view settings
    pub paginator: PaginatorConfig,
    /// Trade record spreadsheet
    pub trade_record: TradeRecordConfig,
    /// Talent pool spreadsheet
    pub pool_finder: PoolFinderConfig,
    /// Google API endpoints
    pub google: GoogleConfig,
    /// `!share` settings
    pub share: ShareConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            paginator: PaginatorConfig::default(),
            trade_record: TradeRecordConfig::default(),
            pool_finder: PoolFinderConfig::default(),
            google: GoogleConfig::default(),
            share: ShareConfig::default(),
        }
    }
}

/// `[paginator]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginatorConfig {
    /// Rows per summary page
    pub page_size: usize,
    /// Inactivity timeout of toggleable views, in seconds
    pub timeout_secs: u64,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            timeout_secs: paginator::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl PaginatorConfig {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[trade_record]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TradeRecordConfig {
    /// Spreadsheet holding the ledger
    pub spreadsheet_id: String,
    /// A1 range including the header row
    pub range: String,
}

impl Default for TradeRecordConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "'Trade Record'!A1:H".to_string(),
        }
    }
}

/// `[pool_finder]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolFinderConfig {
    /// Spreadsheet holding the talent table
    pub spreadsheet_id: String,
    /// Sheet (tab) name
    pub sheet_name: String,
    /// Range within the sheet
    pub range: String,
}

impl Default for PoolFinderConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: pool_finder::DEFAULT_SHEET_NAME.to_string(),
            range: pool_finder::DEFAULT_RANGE.to_string(),
        }
    }
}

/// `[google]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Sheets v4 base URL
    pub sheets_base_url: String,
    /// Drive v3 base URL
    pub drive_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: google::SHEETS_BASE_URL.to_string(),
            drive_base_url: google::DRIVE_BASE_URL.to_string(),
            token_url: google::TOKEN_URL.to_string(),
        }
    }
}

/// `[share]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// How long the revoke button stays live, in seconds
    pub control_timeout_secs: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            control_timeout_secs: 600,
        }
    }
}

impl ShareConfig {
    /// Control lifetime as a [`Duration`].
    #[must_use]
    pub const fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }
}

impl AppConfig {
    /// Parses TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config file: {e}"),
        })
    }

    /// Rejects settings the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(config_error("prefix must not be empty"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.paginator.page_size) {
            return Err(config_error(format!(
                "paginator.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.paginator.page_size
            )));
        }
        for (key, url) in [
            ("google.sheets_base_url", &self.google.sheets_base_url),
            ("google.drive_base_url", &self.google.drive_base_url),
            ("google.token_url", &self.google.token_url),
        ] {
            if url.trim().is_empty() {
                return Err(config_error(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

/// Loads and validates the config at `path`; a missing file gives the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => AppConfig::from_toml(&contents)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(e) => {
            return Err(config_error(format!(
                "Failed to read config file {}: {e}",
                path.display()
            )));
        }
    };
    config.validate()?;
    Ok(config)
}

/// Loads the config from [`CONFIG_PATH_VAR`] or [`DEFAULT_CONFIG_PATH`].
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
