use serde::{Deserialize, Serialize};

/// Column headers shown in the results table and written to CSV exports
pub const LEAD_COLUMNS: [&str; 7] =
    ["Name", "Email", "Phone", "Website", "Address", "Rating", "Hours"];

/// A business record returned by the remote scrape endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_name")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_optional_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_rating")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_hours")]
    pub hours: Option<String>,
}

impl Lead {
    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    pub fn has_phone(&self) -> bool {
        self.phone.is_some()
    }

    /// Cell values in `LEAD_COLUMNS` order; absent fields render as empty strings
    pub fn cells(&self) -> [String; 7] {
        [
            self.name.clone(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            self.website.clone().unwrap_or_default(),
            self.address.clone().unwrap_or_default(),
            self.rating.map(format_rating).unwrap_or_default(),
            self.hours.clone().unwrap_or_default(),
        ]
    }
}

fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 { format!("{:.0}", rating) } else { format!("{}", rating) }
}

/// Row subsets offered by the results view and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadFilter {
    #[default]
    All,
    WithEmail,
    WithPhone,
}

impl LeadFilter {
    pub fn matches(self, lead: &Lead) -> bool {
        match self {
            LeadFilter::All => true,
            LeadFilter::WithEmail => lead.has_email(),
            LeadFilter::WithPhone => lead.has_phone(),
        }
    }

    pub fn apply(self, leads: &[Lead]) -> Vec<&Lead> {
        leads.iter().filter(|lead| self.matches(lead)).collect()
    }
}

/// Derived counts for the summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadCounts {
    pub total: usize,
    pub with_email: usize,
    pub with_phone: usize,
}

impl LeadCounts {
    pub fn from_leads(leads: &[Lead]) -> Self {
        Self {
            total: leads.len(),
            with_email: leads.iter().filter(|l| l.has_email()).count(),
            with_phone: leads.iter().filter(|l| l.has_phone()).count(),
        }
    }

    /// e.g. "7 leads (4 with email)"
    pub fn summary(&self) -> String {
        let noun = if self.total == 1 { "lead" } else { "leads" };
        format!("{} {} ({} with email)", self.total, noun, self.with_email)
    }
}
