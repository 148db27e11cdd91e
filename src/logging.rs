//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr. The interactive UI owns the terminal, so it logs to
//! `<cache_dir>/lead-search/lead-search.log` instead.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::{ENV_LOG, get_cache_dir};

const LOG_FILENAME: &str = "lead-search.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Default log file for interactive sessions
    pub fn default_file() -> Result<Self> {
        Ok(LogTarget::File(get_cache_dir()?.join(LOG_FILENAME)))
    }
}

/// Filter from `LEAD_SEARCH_LOG`, else `warn`; `verbose` forces debug output for this crate
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("warn,lead_search=debug");
    }
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbose: bool, target: &LogTarget) -> Result<()> {
    let filter = build_filter(verbose);

    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow!(e))?,
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!(e))?
        }
    }

    Ok(())
}
