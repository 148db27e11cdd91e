//! Response bodies of the remote endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Lead, SearchStats, UsageState};

/// Successful `/scrape` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub results: Vec<Lead>,
    #[serde(default)]
    pub usage: Option<UsageState>,
    #[serde(default)]
    pub stats: Option<SearchStats>,
}

impl ScrapeResponse {
    /// Older servers answer with a bare list of leads and no usage block
    pub fn from_leads(results: Vec<Lead>) -> Self {
        Self { results, usage: None, stats: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetTimes {
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub daily: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub monthly: Option<DateTime<Utc>>,
}

/// `/status` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub usage: UsageState,
    #[serde(default)]
    pub reset: Option<ResetTimes>,
}

impl StatusResponse {
    /// Usage with reset times filled from the `reset` block where the usage object lacks them
    pub fn merged_usage(&self) -> UsageState {
        let mut usage = self.usage.clone();
        if let Some(reset) = &self.reset {
            usage.reset_daily = usage.reset_daily.or(reset.daily);
            usage.reset_monthly = usage.reset_monthly.or(reset.monthly);
        }
        usage
    }
}

/// `/activate` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// `/login` and `/logout` bodies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tier: Option<String>,
}
