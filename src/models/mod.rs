//! Data models for the lead search client.
//!
//! - [`Tier`], [`AccountState`], [`UsageState`] - account identity and server-mirrored usage
//! - [`Lead`], [`LeadCounts`], [`LeadFilter`] - result rows and their derived views
//! - [`SearchQuery`], [`SearchHistoryEntry`], [`SearchStats`] - per-submission data
//!
//! Wire decoding for lenient fields lives in `parsers::deserializers`.

pub mod account;
pub mod lead;
pub mod search;

pub use account::{
    AccountState, DEFAULT_COUNT, DEFAULT_MAX_COUNT, MIN_COUNT, Tier, UsageState, mask_key,
};
pub use lead::{LEAD_COLUMNS, Lead, LeadCounts, LeadFilter};
pub use search::{SearchHistoryEntry, SearchQuery, SearchStats};
