use thiserror::Error;

/// Failure to complete an HTTP exchange at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Could not connect to the lead API: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Everything a remote call can end in besides success
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent
    #[error("{0}")]
    Validation(String),

    /// HTTP 429 from the server
    #[error("{message}{}", quota_suffix(.used, .limit))]
    QuotaExceeded { message: String, used: Option<u64>, limit: Option<u64> },

    /// Non-success status, an `error` key in the body, or a body that could not be decoded
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Short label for the failure class, used in status lines and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::QuotaExceeded { .. } => "quota",
            ClientError::Api { .. } => "api",
            ClientError::Transport(_) => "transport",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::QuotaExceeded { .. } => Some(429),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn quota_suffix(used: &Option<u64>, limit: &Option<u64>) -> String {
    match (used, limit) {
        (Some(used), Some(limit)) => format!(" ({} of {} used)", used, limit),
        (Some(used), None) => format!(" ({} used)", used),
        (None, Some(limit)) => format!(" (limit {})", limit),
        (None, None) => String::new(),
    }
}
