//! Lead Search - query a remote lead-generation API from the terminal
//!
//! This library wraps the lead API (`/scrape`, `/status`, `/activate`, `/login`, `/logout`)
//! and keeps the client-side state around it. It supports:
//!
//! - Validated searches with tier-aware count clamping
//! - Mirroring tier and usage counters exactly as the server reports them
//! - Paging, filtering and CSV export of the cached result set
//! - An interactive terminal UI and one-shot subcommands
//!
//! # Example
//!
//! ```no_run
//! use lead_search::{ApiClient, Config, ConfigOverrides, Session};
//!
//! let config = Config::load(&ConfigOverrides::default())?;
//! let api = ApiClient::from_config(&config)?;
//! let mut session = Session::from_config(&config);
//! let summary = session.submit_search(&api, "dentist", "Berlin", 10)?;
//! println!("{}", summary.message());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod session;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use api::{ApiClient, ClientError, LeadApi};
pub use config::{Config, ConfigOverrides};
pub use models::{AccountState, Lead, LeadFilter, SearchQuery, Tier, UsageState};
pub use session::{SearchSummary, Session};
