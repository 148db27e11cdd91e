use std::time::Duration;

use serde_json::{Value, json};

use super::error::ClientError;
use super::transport::{ApiRequest, HttpTransport, Method, ReqwestTransport};
use super::types::{AckResponse, ActivateResponse, ScrapeResponse, StatusResponse};
use crate::config::Config;
use crate::models::{AccountState, Lead, SearchQuery, Tier};
use crate::parsers::{check_response, decode};

/// Operations offered by the remote lead API
pub trait LeadApi {
    fn scrape(&self, api_key: &str, query: &SearchQuery) -> Result<ScrapeResponse, ClientError>;
    fn status(&self, api_key: &str) -> Result<StatusResponse, ClientError>;
    /// Exchange a license key for a premium account
    fn activate(&self, api_key: &str, license_key: &str) -> Result<AccountState, ClientError>;
    /// Sign in with an existing premium key
    fn login(&self, premium_key: &str) -> Result<AccountState, ClientError>;
    fn logout(&self, api_key: &str) -> Result<(), ClientError>;
}

/// JSON-over-HTTP client for the lead API
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    search_timeout: Duration,
    account_timeout: Duration,
}

impl ApiClient<ReqwestTransport> {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(&config.api_url)?;
        Ok(Self::with_transport(transport, config.search_timeout(), config.account_timeout()))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(transport: T, search_timeout: Duration, account_timeout: Duration) -> Self {
        Self { transport, search_timeout, account_timeout }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(
        &self,
        method: Method,
        path: &'static str,
        api_key: Option<&str>,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<(u16, Value), ClientError> {
        let request =
            ApiRequest { method, path, api_key: api_key.map(str::to_string), body, timeout };
        let raw = self.transport.send(&request)?;
        let value = check_response(&raw)?;
        Ok((raw.status, value))
    }
}

impl<T: HttpTransport> LeadApi for ApiClient<T> {
    fn scrape(&self, api_key: &str, query: &SearchQuery) -> Result<ScrapeResponse, ClientError> {
        let body = json!({
            "keyword": query.keyword,
            "location": query.location,
            "count": query.count,
        });
        let (status, value) =
            self.call(Method::Post, "/scrape", Some(api_key), Some(body), self.search_timeout)?;

        if value.is_array() {
            let leads: Vec<Lead> = decode(status, value)?;
            return Ok(ScrapeResponse::from_leads(leads));
        }
        decode(status, value)
    }

    fn status(&self, api_key: &str) -> Result<StatusResponse, ClientError> {
        let (status, value) =
            self.call(Method::Get, "/status", Some(api_key), None, self.account_timeout)?;
        decode(status, value)
    }

    fn activate(&self, api_key: &str, license_key: &str) -> Result<AccountState, ClientError> {
        let body = json!({ "key": license_key });
        let (status, value) =
            self.call(Method::Post, "/activate", Some(api_key), Some(body), self.account_timeout)?;
        let response: ActivateResponse = decode(status, value)?;

        match (response.success, response.api_key) {
            (true, Some(new_key)) if !new_key.trim().is_empty() => {
                let tier = response.tier.as_deref().map(Tier::from_server).unwrap_or_default();
                Ok(AccountState::new(tier, new_key))
            }
            _ => Err(ClientError::Api { status, message: "Activation was not accepted".to_string() }),
        }
    }

    fn login(&self, premium_key: &str) -> Result<AccountState, ClientError> {
        let body = json!({ "premium_key": premium_key });
        let (status, value) =
            self.call(Method::Post, "/login", None, Some(body), self.account_timeout)?;
        let response: AckResponse = decode(status, value)?;

        if !response.success {
            return Err(ClientError::Api { status, message: "Login was not accepted".to_string() });
        }
        let tier = response.tier.as_deref().map(Tier::from_server).unwrap_or_default();
        Ok(AccountState::new(tier, premium_key))
    }

    fn logout(&self, api_key: &str) -> Result<(), ClientError> {
        let (status, value) =
            self.call(Method::Post, "/logout", Some(api_key), None, self.account_timeout)?;
        let response: AckResponse = decode(status, value)?;

        if response.success {
            Ok(())
        } else {
            Err(ClientError::Api { status, message: "Logout was not acknowledged".to_string() })
        }
    }
}
