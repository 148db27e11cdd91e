//! Configuration layering for the lead search client
//!
//! Sources, later wins:
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, else `<config_dir>/lead-search/config.toml` if present)
//! 3. Environment (`LEAD_API_URL`, `LEAD_API_KEY`)
//! 4. The `--api-url` command-line flag
//!
//! The API key has no default; running without one is a startup error.

pub mod environment;
pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

pub use environment::{ENV_API_KEY, ENV_API_URL, ENV_LOG, EnvSource, ProcessEnv, get_cache_dir};
pub use file::{FileConfig, default_config_path, load_config_file};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_ACCOUNT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STATUS_REFRESH_SECS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Page sizes the pager cycles through
pub const PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];

/// Fully resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub search_timeout_secs: u64,
    pub account_timeout_secs: u64,
    pub page_size: usize,
    pub status_refresh_secs: u64,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the file system, process environment and flags
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => load_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_config_file(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::resolve(file, &ProcessEnv, overrides.api_url.as_deref())
    }

    /// Merge already-read sources into a `Config`
    pub fn resolve(file: FileConfig, env: &dyn EnvSource, api_url_flag: Option<&str>) -> Result<Self> {
        let api_url = api_url_flag
            .map(str::to_string)
            .or_else(|| env.var(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            bail!("API URL is empty; set {} or api_url in the config file", ENV_API_URL);
        }

        let api_key = env.var(ENV_API_KEY).or(file.api_key).unwrap_or_default().trim().to_string();
        if api_key.is_empty() {
            bail!("{} is not set; an API key is required to start", ENV_API_KEY);
        }

        let page_size = match file.page_size {
            Some(size) if PAGE_SIZES.contains(&size) => size,
            Some(size) => {
                tracing::warn!(page_size = size, "unsupported page size in config, using default");
                DEFAULT_PAGE_SIZE
            }
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_url,
            api_key,
            search_timeout_secs: file.search_timeout_secs.unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS),
            account_timeout_secs: file.account_timeout_secs.unwrap_or(DEFAULT_ACCOUNT_TIMEOUT_SECS),
            page_size,
            status_refresh_secs: file.status_refresh_secs.unwrap_or(DEFAULT_STATUS_REFRESH_SECS),
        })
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn account_timeout(&self) -> Duration {
        Duration::from_secs(self.account_timeout_secs)
    }

    pub fn status_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs)
    }
}
