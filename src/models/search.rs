use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Tier;

/// Validated parameters for one search submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub location: String,
    pub count: u32,
}

impl SearchQuery {
    /// Build a query from raw form input.
    ///
    /// Returns `None` when either text field is blank after trimming. The count is
    /// clamped into the tier's allowed range rather than rejected.
    pub fn from_form(keyword: &str, location: &str, count: u32, tier: Tier) -> Option<Self> {
        let keyword = keyword.trim();
        let location = location.trim();
        if keyword.is_empty() || location.is_empty() {
            return None;
        }
        Some(Self {
            keyword: keyword.to_string(),
            location: location.to_string(),
            count: tier.clamp_count(count),
        })
    }
}

/// One completed search, kept for the lifetime of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistoryEntry {
    pub keyword: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
}

/// Optional timing block returned alongside results
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Server-side processing time in seconds
    #[serde(default)]
    pub time: f64,
}
