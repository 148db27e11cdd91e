//! TUI application state and event handling.
//!
//! The `App` owns one [`Session`] for its lifetime plus the form fields, focus, prompt and
//! status-bar state around it. It manages:
//!
//! - **Form editing**: keyword, location and count fields with Tab focus cycling
//! - **Search lifecycle**: a submission is validated immediately, the "Searching..." frame is
//!   drawn, and only then is the blocking `/scrape` call made
//! - **Account prompts**: license activation and premium-key login in a modal input
//! - **Status messages**: transient feedback for searches, exports and account changes
//! - **Dirty state tracking**: redraw only when state changes (or every 100ms for resizes)
//!
//! Input typed while a request is running is discarded once it returns.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, discard_pending_events, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::api::{ApiClient, ClientError, LeadApi};
use crate::export::{default_file_name, export_to_file};
use crate::models::{DEFAULT_COUNT, LeadFilter, SearchQuery};
use crate::session::{Session, StatusRefresh};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for warning and error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Longest accepted text input, in characters
const MAX_INPUT_LEN: usize = 256;
/// Up/Down step on the count field
const COUNT_STEP: u32 = 5;
/// The count field accepts at most three digits
const MAX_TYPED_COUNT: u32 = 999;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Warning,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Which widget receives typed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Keyword,
    Location,
    Count,
    Results,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Keyword => Focus::Location,
            Focus::Location => Focus::Count,
            Focus::Count => Focus::Results,
            Focus::Results => Focus::Keyword,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Keyword => Focus::Results,
            Focus::Location => Focus::Keyword,
            Focus::Count => Focus::Location,
            Focus::Results => Focus::Count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    License,
    PremiumKey,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::License => " Activate license ",
            PromptKind::PremiumKey => " Log in with premium key ",
        }
    }
}

/// Modal single-line input for account keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

pub struct App<A: LeadApi = ApiClient> {
    api: A,
    session: Session,
    keyword: String,
    location: String,
    count: u32,
    focus: Focus,
    /// Row index within the current page
    selected_row: usize,
    prompt: Option<Prompt>,
    pending_search: Option<SearchQuery>,
    export_dir: PathBuf,
    status_refresh_interval: Duration,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<A: LeadApi> App<A> {
    pub fn new(
        api: A,
        session: Session,
        status_refresh_interval: Duration,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            session,
            keyword: String::new(),
            location: String::new(),
            count: DEFAULT_COUNT,
            focus: Focus::Keyword,
            selected_row: 0,
            prompt: None,
            pending_search: None,
            export_dir,
            status_refresh_interval,
            should_quit: false,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType) {
        let duration_ms = match message_type {
            MessageType::Success => STATUS_SUCCESS_DURATION_MS,
            MessageType::Warning | MessageType::Error => STATUS_ERROR_DURATION_MS,
        };
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Check and clear expired status messages
    fn check_and_clear_expired_status(&mut self) {
        let should_clear = self
            .status_message
            .as_ref()
            .map(|msg| Instant::now() >= msg.expires_at)
            .unwrap_or(false);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            // The "Searching..." frame is on screen; now block on the request
            if self.pending_search.is_some() {
                self.execute_pending_search();
                let discarded = discard_pending_events()?;
                if discarded > 0 {
                    tracing::debug!(discarded, "dropped input typed during search");
                }
                continue;
            }

            if self.session.refresh_status_if_due(&self.api, self.status_refresh_interval) {
                self.needs_redraw = true;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        RenderState {
            session: &self.session,
            keyword: &self.keyword,
            location: &self.location,
            count: self.count,
            focus: self.focus,
            selected_row: self.selected_row,
            prompt: self.prompt.as_ref(),
            status_message: self.status_message.as_ref(),
            searching: self.pending_search.as_ref(),
        }
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }
        if self.pending_search.is_some() {
            return;
        }
        if self.prompt.is_some() {
            self.handle_prompt_action(action);
            return;
        }

        match action {
            Action::Cancel => self.cancel(),
            Action::FocusNext => self.set_focus(self.focus.next()),
            Action::FocusPrev => self.set_focus(self.focus.prev()),
            Action::MoveUp => match self.focus {
                Focus::Count => self.adjust_count(false),
                _ => self.move_selection(-1),
            },
            Action::MoveDown => match self.focus {
                Focus::Count => self.adjust_count(true),
                _ => self.move_selection(1),
            },
            Action::PrevPage => self.change_page(false),
            Action::NextPage => self.change_page(true),
            Action::Submit => self.start_search(),
            Action::CyclePageSize => {
                self.session.cycle_page_size();
                self.selected_row = 0;
                let size = self.session.pager().page_size();
                self.set_status(format!("{} rows per page", size), MessageType::Success);
            }
            Action::ExportAll => self.export(LeadFilter::All),
            Action::ExportEmailOnly => self.export(LeadFilter::WithEmail),
            Action::PromptLicense => self.open_prompt(PromptKind::License),
            Action::PromptPremiumKey => self.open_prompt(PromptKind::PremiumKey),
            Action::Logout => self.logout(),
            Action::RefreshStatus => self.refresh_status(),
            Action::Input(c) => self.handle_input(c),
            Action::DeleteChar => self.delete_char(),
            Action::Quit | Action::None => {}
        }
    }

    fn handle_prompt_action(&mut self, action: Action) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match action {
            Action::Cancel => self.prompt = None,
            Action::Submit => {
                self.submit_prompt();
                return;
            }
            Action::Input(c) if prompt.input.chars().count() < MAX_INPUT_LEN => {
                prompt.input.push(c);
            }
            Action::DeleteChar => {
                prompt.input.pop();
            }
            _ => return,
        }
        self.needs_redraw = true;
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt { kind, input: String::new() });
        self.needs_redraw = true;
    }

    fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let outcome = match prompt.kind {
            PromptKind::License => self
                .session
                .activate(&self.api, &prompt.input)
                .map(|account| format!("✓ License activated: {} tier", account.tier)),
            PromptKind::PremiumKey => self
                .session
                .login(&self.api, &prompt.input)
                .map(|account| format!("✓ Logged in: {} tier", account.tier)),
        };

        match outcome {
            Ok(message) => {
                self.set_status(message, MessageType::Success);
                // Pick up the new tier's usage limits
                if let Err(err) = self.session.refresh_status(&self.api) {
                    tracing::warn!(error = %err, "status refresh after account change failed");
                }
            }
            Err(err @ ClientError::Validation(_)) => {
                self.prompt = Some(prompt);
                self.set_status(err.to_string(), MessageType::Warning);
            }
            Err(err) => self.set_status(format!("✗ {}", err), MessageType::Error),
        }
    }

    fn cancel(&mut self) {
        let field = match self.focus {
            Focus::Keyword => &mut self.keyword,
            Focus::Location => &mut self.location,
            Focus::Count | Focus::Results => {
                self.should_quit = true;
                return;
            }
        };
        if field.is_empty() {
            self.should_quit = true;
        } else {
            field.clear();
            self.needs_redraw = true;
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.needs_redraw = true;
    }

    fn handle_input(&mut self, c: char) {
        match self.focus {
            Focus::Keyword | Focus::Location => {
                let field =
                    if self.focus == Focus::Keyword { &mut self.keyword } else { &mut self.location };
                // Limit field length to prevent oversized requests
                if field.chars().count() < MAX_INPUT_LEN {
                    field.push(c);
                    self.needs_redraw = true;
                }
            }
            Focus::Count => {
                if let Some(digit) = c.to_digit(10) {
                    self.count = (self.count * 10 + digit).min(MAX_TYPED_COUNT);
                    self.needs_redraw = true;
                }
            }
            Focus::Results => {}
        }
    }

    fn delete_char(&mut self) {
        let changed = match self.focus {
            Focus::Keyword => self.keyword.pop().is_some(),
            Focus::Location => self.location.pop().is_some(),
            Focus::Count => {
                self.count /= 10;
                true
            }
            Focus::Results => false,
        };
        if changed {
            self.needs_redraw = true;
        }
    }

    /// Step the count by `COUNT_STEP` inside the current tier's bounds
    fn adjust_count(&mut self, up: bool) {
        let tier = self.session.account().tier;
        let stepped =
            if up { self.count.saturating_add(COUNT_STEP) } else { self.count.saturating_sub(COUNT_STEP) };
        self.count = tier.clamp_count(stepped);
        self.needs_redraw = true;
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.session.page_rows().len();
        if rows == 0 {
            self.selected_row = 0;
            return;
        }

        let old_idx = self.selected_row;
        let new_idx = (self.selected_row as isize + delta).max(0) as usize;
        self.selected_row = new_idx.min(rows - 1);

        if old_idx != self.selected_row {
            self.needs_redraw = true;
        }
    }

    fn change_page(&mut self, forward: bool) {
        let moved = if forward { self.session.next_page() } else { self.session.prev_page() };
        if moved {
            self.selected_row = 0;
            self.needs_redraw = true;
        }
    }

    /// Validate the form and queue the request for after the next draw
    fn start_search(&mut self) {
        match self.session.begin_search(&self.keyword, &self.location, self.count) {
            Ok(query) => {
                self.count = query.count;
                self.pending_search = Some(query);
                self.status_message = None;
                self.needs_redraw = true;
            }
            Err(err) => self.set_status(err.to_string(), MessageType::Warning),
        }
    }

    fn execute_pending_search(&mut self) {
        let Some(query) = self.pending_search.take() else {
            return;
        };
        let result = self.api.scrape(&self.session.account().api_key, &query);
        match self.session.complete_search(query, result) {
            Ok(summary) => {
                self.selected_row = 0;
                self.focus = Focus::Results;
                let message_type =
                    if summary.counts.total == 0 { MessageType::Warning } else { MessageType::Success };
                self.set_status(summary.message(), message_type);
            }
            Err(err) => self.set_status(format!("✗ {}", err), MessageType::Error),
        }
    }

    fn refresh_status(&mut self) {
        match self.session.refresh_status(&self.api) {
            Ok(StatusRefresh::Updated) => {
                let tier = self.session.account().tier;
                self.set_status(format!("✓ Status refreshed: {} tier", tier), MessageType::Success);
            }
            Ok(StatusRefresh::FellBackToFree) => {
                self.set_status("Key not recognized, using the free tier", MessageType::Warning)
            }
            Err(err) => self.set_status(format!("✗ Status refresh failed: {}", err), MessageType::Error),
        }
    }

    fn logout(&mut self) {
        match self.session.logout(&self.api) {
            Ok(()) => self.set_status("✓ Logged out, back on the free tier", MessageType::Success),
            Err(err) => self.set_status(
                format!("Logged out locally; server call failed: {}", err),
                MessageType::Warning,
            ),
        }
    }

    fn export(&mut self, filter: LeadFilter) {
        let file_name = default_file_name(self.session.last_query(), filter);
        let path = self.export_dir.join(&file_name);
        match export_to_file(&path, self.session.results(), filter) {
            Ok(rows) => {
                self.set_status(format!("✓ Exported {} rows to {}", rows, file_name), MessageType::Success)
            }
            Err(err) => self.set_status(format!("✗ {:#}", err), MessageType::Error),
        }
    }
}
