use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest number of leads a search may request, regardless of tier
pub const MIN_COUNT: u32 = 5;
/// Count used when the form is first shown
pub const DEFAULT_COUNT: u32 = 10;
/// Upper bound applied when the tier is unknown
pub const DEFAULT_MAX_COUNT: u32 = 20;

/// Usage-limit bracket associated with an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Starter,
    Pro,
    Enterprise,
}

/// Static tier -> max lead count table
const TIER_LIMITS: [(Tier, u32); 4] =
    [(Tier::Free, 20), (Tier::Starter, 50), (Tier::Pro, 100), (Tier::Enterprise, 200)];

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Starter, Tier::Pro, Tier::Enterprise];

    /// Maximum `count` a search may request on this tier
    pub fn max_count(self) -> u32 {
        TIER_LIMITS
            .iter()
            .find(|(tier, _)| *tier == self)
            .map(|(_, max)| *max)
            .unwrap_or(DEFAULT_MAX_COUNT)
    }

    /// Clamp a requested count into `[MIN_COUNT, max_count]`
    pub fn clamp_count(self, count: u32) -> u32 {
        count.clamp(MIN_COUNT, self.max_count())
    }

    pub fn is_premium(self) -> bool {
        self != Tier::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Parse a server-reported tier name, falling back to `Free` for anything unrecognized
    pub fn from_server(name: &str) -> Tier {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(tier = name, "unrecognized tier reported by server, treating as free");
            Tier::Free
        })
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "starter" => Ok(Tier::Starter),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account identity for the current session.
///
/// `premium` is derived from the tier rather than stored, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub tier: Tier,
    pub api_key: String,
}

impl AccountState {
    pub fn new(tier: Tier, api_key: impl Into<String>) -> Self {
        Self { tier, api_key: api_key.into() }
    }

    /// Default free-tier account using the configured startup key
    pub fn free(default_key: &str) -> Self {
        Self::new(Tier::Free, default_key)
    }

    pub fn premium(&self) -> bool {
        self.tier.is_premium()
    }

    /// API key with everything but the last four characters masked, for logs and display
    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Usage counters exactly as last reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    #[serde(default)]
    pub daily: u64,
    #[serde(default)]
    pub monthly: u64,
    #[serde(default, alias = "dailyLimit")]
    pub daily_limit: u64,
    #[serde(default, alias = "monthlyLimit")]
    pub monthly_limit: u64,
    #[serde(
        default,
        alias = "resetDaily",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub reset_daily: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "resetMonthly",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub reset_monthly: Option<DateTime<Utc>>,
}

impl UsageState {
    pub fn daily_percent(&self) -> u16 {
        percent(self.daily, self.daily_limit)
    }

    pub fn monthly_percent(&self) -> u16 {
        percent(self.monthly, self.monthly_limit)
    }
}

/// Display percentage of `used` against `limit`, 0 when there is no limit, capped at 100
fn percent(used: u64, limit: u64) -> u16 {
    if limit == 0 {
        return 0;
    }
    ((used.saturating_mul(100) / limit).min(100)) as u16
}
