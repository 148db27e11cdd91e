//! HTTP seam between the API client and the network.
//!
//! [`HttpTransport`] is the only place a request leaves the process, so tests can swap in a
//! canned transport and exercise every response branch without a server.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;

use super::error::TransportError;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request to one of the remote endpoints, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub api_key: Option<String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Status code and undecoded body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub trait HttpTransport {
    fn send(&self, request: &ApiRequest) -> std::result::Result<RawResponse, TransportError>;
}

/// Blocking reqwest transport against a fixed base URL
pub struct ReqwestTransport {
    base_url: String,
    client: Client,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("lead-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> std::result::Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .timeout(request.timeout);

        if let Some(key) = &request.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = ?request.method, %url, "sending request");
        let response = builder.send().map_err(|e| classify_error(e, request.timeout))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| classify_error(e, request.timeout))?;
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(RawResponse { status, body })
    }
}

fn classify_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:8000/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_connection_refused_is_connect_error() {
        // Grab a free port, then release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = ReqwestTransport::new(&format!("http://127.0.0.1:{}", port)).unwrap();
        let request = ApiRequest {
            method: Method::Get,
            path: "/status",
            api_key: Some("key".to_string()),
            body: None,
            timeout: Duration::from_secs(2),
        };
        let err = transport.send(&request).unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "unexpected error: {:?}", err);
    }
}
