use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const ENV_API_URL: &str = "LEAD_API_URL";
pub const ENV_API_KEY: &str = "LEAD_API_KEY";
/// Filter directive for log output, e.g. `lead_search=debug`
pub const ENV_LOG: &str = "LEAD_SEARCH_LOG";

/// Lookup of configuration variables (the process environment in production)
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from `std::env`
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// Directory for log files (`<cache_dir>/lead-search`)
pub fn get_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(base.join("lead-search"))
}
