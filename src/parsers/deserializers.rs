use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Unix timestamps above this are taken to be milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Timestamp that may be null, unix seconds (integer or fractional) or millis, RFC3339,
/// or a naive ISO string (assumed UTC). Anything unreadable decodes to `None` with a warning.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(raw) => timestamp_from_int(raw),
            None => n.as_f64().and_then(timestamp_from_float),
        },
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            parse_timestamp_str(s)
        }
        _ => None,
    };

    if parsed.is_none() {
        tracing::warn!(value = %value, "unreadable timestamp from server, ignoring it");
    }
    Ok(parsed)
}

fn timestamp_from_int(raw: i64) -> Option<DateTime<Utc>> {
    if raw.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

fn timestamp_from_float(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    if raw.abs() >= MILLIS_THRESHOLD as f64 {
        return DateTime::from_timestamp_millis(raw.round() as i64);
    }
    let secs = raw.floor();
    let nanos = ((raw - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = s.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|naive| naive.and_utc())
}

/// Text field where null, blanks and non-text values collapse to `None`; numbers are kept as text
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Business name; missing or null becomes the empty string
pub fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.unwrap_or_default())
}

/// Rating given either as a number or a numeric string
pub fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Opening hours as one string or a list of per-day strings
pub fn deserialize_hours<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => non_blank(s),
        Value::Array(items) => {
            let days: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => non_blank(s),
                    _ => None,
                })
                .collect();
            if days.is_empty() { None } else { Some(days.join("; ")) }
        }
        _ => None,
    })
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::api::ScrapeResponse;
    use crate::models::{Lead, UsageState};

    #[test]
    fn test_lead_blank_fields_are_absent() {
        let json = r#"{"name":"Smile Dental","email":"","phone":null,"website":"  "}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.name, "Smile Dental");
        assert!(lead.email.is_none());
        assert!(lead.phone.is_none());
        assert!(lead.website.is_none());
    }

    #[test]
    fn test_lead_numeric_phone_and_string_rating() {
        let json = r#"{"name":"Gym","phone":4930123456,"rating":"4.7"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.phone.as_deref(), Some("4930123456"));
        assert_eq!(lead.rating, Some(4.7));
    }

    #[test]
    fn test_lead_hours_list_is_joined() {
        let json = r#"{"name":"Bakery","hours":["Mon: 7-18","","Tue: 7-18"]}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.hours.as_deref(), Some("Mon: 7-18; Tue: 7-18"));
    }

    #[test]
    fn test_lead_missing_name_and_unknown_fields() {
        let json = r#"{"email":"a@b.com","place_id":"xyz"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.name, "");
        assert_eq!(lead.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_timestamp_formats() {
        let json = r#"{"reset_daily":1760918400,"reset_monthly":"2026-11-01T00:00:00"}"#;
        let usage: UsageState = serde_json::from_str(json).unwrap();
        assert_eq!(usage.reset_daily, DateTime::from_timestamp(1760918400, 0));
        assert_eq!(usage.reset_monthly, Some(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_timestamp_millis_and_offset() {
        let json = r#"{"reset_daily":1760918400000,"reset_monthly":"2026-11-01T02:00:00+02:00"}"#;
        let usage: UsageState = serde_json::from_str(json).unwrap();
        assert_eq!(usage.reset_daily, DateTime::from_timestamp(1760918400, 0));
        assert_eq!(usage.reset_monthly, Some(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_timestamp_unreadable_values_are_dropped() {
        let json = r#"{"daily":2,"reset_daily":"tomorrow","reset_monthly":{"at":1}}"#;
        let usage: UsageState = serde_json::from_str(json).unwrap();
        assert_eq!(usage.daily, 2);
        assert_eq!(usage.reset_daily, None);
        assert_eq!(usage.reset_monthly, None);
    }

    #[test]
    fn test_timestamp_fractional_seconds() {
        let json = r#"{"reset_daily":1760918400.25,"reset_monthly":1760918400.0}"#;
        let usage: UsageState = serde_json::from_str(json).unwrap();
        assert_eq!(usage.reset_daily, DateTime::from_timestamp(1760918400, 250_000_000));
        assert_eq!(usage.reset_monthly, DateTime::from_timestamp(1760918400, 0));
    }

    #[test]
    fn test_scrape_body_with_odd_reset_keeps_results() {
        let json = r#"{"results":[{"name":"Praxis"}],"usage":{"daily":1,"daily_limit":3,"reset_daily":1760918400.25}}"#;
        let response: ScrapeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.usage.map(|u| u.daily), Some(1));
    }
}
