use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::error::ClientError;
use crate::api::transport::RawResponse;

/// How much of an undecodable body is echoed back in error messages
pub const SNIPPET_CHARS: usize = 300;

/// Classify a raw response into a JSON value or the matching `ClientError`.
///
/// Order matters: a 429 is always a quota error even without a JSON body, an `error` key
/// wins over the status code, and anything else outside 2xx is an API error.
pub fn check_response(raw: &RawResponse) -> Result<Value, ClientError> {
    let parsed = serde_json::from_str::<Value>(&raw.body);

    if raw.status == 429 {
        let body = parsed.unwrap_or(Value::Null);
        return Err(ClientError::QuotaExceeded {
            message: error_message(&body).unwrap_or_else(|| "Rate limit exceeded".to_string()),
            used: body.get("used").and_then(Value::as_u64),
            limit: body.get("limit").and_then(Value::as_u64),
        });
    }

    let body = match parsed {
        Ok(body) => body,
        Err(_) => {
            return Err(ClientError::Api {
                status: raw.status,
                message: format!("Invalid JSON response: {}", snippet(&raw.body)),
            });
        }
    };

    if let Some(message) = error_message(&body) {
        return Err(ClientError::Api { status: raw.status, message });
    }

    if !(200..300).contains(&raw.status) {
        return Err(ClientError::Api {
            status: raw.status,
            message: format!("Unexpected response: {}", snippet(&raw.body)),
        });
    }

    Ok(body)
}

/// Decode a checked body into a typed response
pub fn decode<T: DeserializeOwned>(status: u16, body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::Api {
        status,
        message: format!("Unexpected response shape: {}", e),
    })
}

/// The `error` field of a body, if present and non-null
fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    let mut out: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    if trimmed.chars().count() > SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}
