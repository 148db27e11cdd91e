use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::pager::Pager;
use crate::api::{ClientError, LeadApi, ScrapeResponse};
use crate::config::Config;
use crate::models::{
    AccountState, Lead, LeadCounts, LeadFilter, SearchHistoryEntry, SearchQuery, SearchStats, Tier,
    UsageState,
};

/// Searches remembered per session
pub const HISTORY_LIMIT: usize = 10;
pub const EMPTY_FIELDS_MESSAGE: &str = "Please enter both fields.";
pub const NO_LEADS_MESSAGE: &str = "No leads found. Try a broader keyword or location.";

/// Where the current submission is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Validating,
    Requesting,
}

/// How the most recent submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Success,
    Rejected,
    QuotaExceeded,
    ApiError,
    TransportError,
}

impl SearchOutcome {
    fn from_error(err: &ClientError) -> Self {
        match err {
            ClientError::Validation(_) => SearchOutcome::Rejected,
            ClientError::QuotaExceeded { .. } => SearchOutcome::QuotaExceeded,
            ClientError::Api { .. } => SearchOutcome::ApiError,
            ClientError::Transport(_) => SearchOutcome::TransportError,
        }
    }
}

/// Result of a completed search, for display
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    pub query: SearchQuery,
    pub counts: LeadCounts,
    pub stats: Option<SearchStats>,
}

impl SearchSummary {
    /// "7 leads (4 with email)", with timing when the server sent it
    pub fn message(&self) -> String {
        if self.counts.total == 0 {
            return NO_LEADS_MESSAGE.to_string();
        }
        match self.stats {
            Some(stats) => format!("{} in {:.1}s", self.counts.summary(), stats.time),
            None => self.counts.summary(),
        }
    }
}

/// How a status refresh was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRefresh {
    Updated,
    /// The server did not recognize the key (401/404); the session is back on the free tier
    FellBackToFree,
}

/// All mutable state for one user session.
///
/// Usage counters are only ever replaced with server-reported values.
#[derive(Debug, Clone)]
pub struct Session {
    default_api_key: String,
    account: AccountState,
    usage: UsageState,
    results: Vec<Lead>,
    last_query: Option<SearchQuery>,
    last_stats: Option<SearchStats>,
    history: VecDeque<SearchHistoryEntry>,
    pager: Pager,
    phase: SearchPhase,
    last_outcome: Option<SearchOutcome>,
    last_status_attempt: Option<Instant>,
}

impl Session {
    pub fn new(default_api_key: &str, page_size: usize) -> Self {
        Self {
            default_api_key: default_api_key.to_string(),
            account: AccountState::free(default_api_key),
            usage: UsageState::default(),
            results: Vec::new(),
            last_query: None,
            last_stats: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            pager: Pager::new(page_size),
            phase: SearchPhase::Idle,
            last_outcome: None,
            last_status_attempt: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_key, config.page_size)
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn default_account(&self) -> AccountState {
        AccountState::free(&self.default_api_key)
    }

    pub fn usage(&self) -> &UsageState {
        &self.usage
    }

    pub fn results(&self) -> &[Lead] {
        &self.results
    }

    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    pub fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats
    }

    /// Most recent search first
    pub fn history(&self) -> impl Iterator<Item = &SearchHistoryEntry> {
        self.history.iter().rev()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn last_outcome(&self) -> Option<SearchOutcome> {
        self.last_outcome
    }

    pub fn counts(&self) -> LeadCounts {
        LeadCounts::from_leads(&self.results)
    }

    /// Rows on the current page
    pub fn page_rows(&self) -> &[Lead] {
        self.pager.slice(&self.results)
    }

    pub fn filtered(&self, filter: LeadFilter) -> Vec<&Lead> {
        filter.apply(&self.results)
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next(self.results.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to(page, self.results.len());
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        self.pager.set_page_size(page_size)
    }

    pub fn cycle_page_size(&mut self) {
        self.pager.cycle_page_size();
    }

    /// Validate form input and mark the search as in flight.
    ///
    /// Refused while another search is outstanding. Blank fields end the lifecycle here
    /// without any request being made.
    pub fn begin_search(
        &mut self,
        keyword: &str,
        location: &str,
        count: u32,
    ) -> Result<SearchQuery, ClientError> {
        if self.phase == SearchPhase::Requesting {
            return Err(ClientError::validation("A search is already in progress."));
        }

        self.phase = SearchPhase::Validating;
        match SearchQuery::from_form(keyword, location, count, self.account.tier) {
            Some(query) => {
                self.phase = SearchPhase::Requesting;
                Ok(query)
            }
            None => {
                self.phase = SearchPhase::Idle;
                self.last_outcome = Some(SearchOutcome::Rejected);
                Err(ClientError::validation(EMPTY_FIELDS_MESSAGE))
            }
        }
    }

    /// Apply the outcome of a request started with [`Session::begin_search`]
    pub fn complete_search(
        &mut self,
        query: SearchQuery,
        result: Result<ScrapeResponse, ClientError>,
    ) -> Result<SearchSummary, ClientError> {
        self.phase = SearchPhase::Idle;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::info!(kind = err.kind(), error = %err, "search failed");
                self.last_outcome = Some(SearchOutcome::from_error(&err));
                return Err(err);
            }
        };

        if let Some(usage) = response.usage {
            self.usage = usage;
        }
        self.results = response.results;
        self.last_stats = response.stats;
        self.pager.reset();

        let counts = self.counts();
        self.push_history(SearchHistoryEntry {
            keyword: query.keyword.clone(),
            location: query.location.clone(),
            timestamp: Utc::now(),
            result_count: counts.total,
        });
        self.last_query = Some(query.clone());
        self.last_outcome = Some(SearchOutcome::Success);

        tracing::info!(
            keyword = %query.keyword,
            location = %query.location,
            total = counts.total,
            with_email = counts.with_email,
            "search completed"
        );
        Ok(SearchSummary { query, counts, stats: self.last_stats })
    }

    /// Validate, call `/scrape` and apply the outcome in one step
    pub fn submit_search(
        &mut self,
        api: &dyn LeadApi,
        keyword: &str,
        location: &str,
        count: u32,
    ) -> Result<SearchSummary, ClientError> {
        let query = self.begin_search(keyword, location, count)?;
        let result = api.scrape(&self.account.api_key, &query);
        self.complete_search(query, result)
    }

    fn push_history(&mut self, entry: SearchHistoryEntry) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    /// Mirror tier and usage from `/status`.
    ///
    /// A 401/404 means the key is not (or no longer) recognized: fall back to the default
    /// free-tier state instead of failing. Other errors keep the last known state.
    pub fn refresh_status(&mut self, api: &dyn LeadApi) -> Result<StatusRefresh, ClientError> {
        self.last_status_attempt = Some(Instant::now());
        match api.status(&self.account.api_key) {
            Ok(status) => {
                self.account.tier = Tier::from_server(&status.tier);
                self.usage = status.merged_usage();
                Ok(StatusRefresh::Updated)
            }
            Err(ClientError::Api { status: 401 | 404, .. }) => {
                tracing::info!("status lookup rejected the current key, falling back to free tier");
                self.account = self.default_account();
                self.usage = UsageState::default();
                Ok(StatusRefresh::FellBackToFree)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a periodic status refresh is due
    pub fn status_refresh_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_status_attempt {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        }
    }

    /// Periodic refresh that never fails: errors are logged and the last known state kept
    pub fn refresh_status_if_due(&mut self, api: &dyn LeadApi, interval: Duration) -> bool {
        if self.phase == SearchPhase::Requesting || !self.status_refresh_due(Instant::now(), interval)
        {
            return false;
        }
        match self.refresh_status(api) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "background status refresh failed, keeping last known state");
                false
            }
        }
    }

    /// Exchange a license key for a premium key and adopt it
    pub fn activate(&mut self, api: &dyn LeadApi, license_key: &str) -> Result<&AccountState, ClientError> {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return Err(ClientError::validation("Please enter a license key."));
        }
        let account = api.activate(&self.account.api_key, license_key)?;
        tracing::info!(tier = %account.tier, key = %account.masked_key(), "license activated");
        self.account = account;
        Ok(&self.account)
    }

    /// Adopt an existing premium key after the server accepts it
    pub fn login(&mut self, api: &dyn LeadApi, premium_key: &str) -> Result<&AccountState, ClientError> {
        let premium_key = premium_key.trim();
        if premium_key.is_empty() {
            return Err(ClientError::validation("Please enter a premium key."));
        }
        let account = api.login(premium_key)?;
        tracing::info!(tier = %account.tier, key = %account.masked_key(), "logged in");
        self.account = account;
        Ok(&self.account)
    }

    /// Tell the server, then reset to the free-tier default whatever it answered
    pub fn logout(&mut self, api: &dyn LeadApi) -> Result<(), ClientError> {
        let result = api.logout(&self.account.api_key);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "logout call failed, resetting locally anyway");
        }
        self.account = self.default_account();
        result
    }
}
