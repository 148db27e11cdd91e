use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table, Wrap,
};

use super::app::{Focus, MessageType, Prompt, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::{format_reset, format_timestamp};
use crate::models::{LEAD_COLUMNS, Lead, SearchQuery};
use crate::session::{NO_LEADS_MESSAGE, Session};
use crate::utils::{sanitize_cell, truncate_chars};

const EMERALD: Color = Color::Rgb(16, 185, 129);
const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const STATUS_BG: Color = Color::Rgb(24, 24, 27);
const RED: Color = Color::Rgb(239, 68, 68);
const AMBER: Color = Color::Rgb(245, 158, 11);

/// Longest cell value shown in the results table
const MAX_CELL_CHARS: usize = 40;

/// Everything a frame needs, borrowed from the app
pub struct RenderState<'a> {
    pub session: &'a Session,
    pub keyword: &'a str,
    pub location: &'a str,
    pub count: u32,
    pub focus: Focus,
    pub selected_row: usize,
    pub prompt: Option<&'a Prompt>,
    pub status_message: Option<&'a StatusMessage>,
    /// Query being sent, while the request is outstanding
    pub searching: Option<&'a SearchQuery>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_form(frame, layout.form_area, state);
    render_usage(frame, layout.usage_area, state.session);
    render_results(frame, layout.results_area, state);
    let selected = state.session.page_rows().get(state.selected_row);
    render_detail(frame, layout.detail_area, selected);
    render_history(frame, layout.history_area, state.session);
    render_status_bar(frame, layout.status_area, state);

    if let Some(prompt) = state.prompt {
        render_prompt(frame, prompt);
    }
}

fn border_style(focused: bool) -> Style {
    if focused { Style::default().fg(EMERALD) } else { Style::default().fg(MUTED) }
}

fn render_form(frame: &mut Frame, area: Rect, state: &RenderState) {
    let [keyword_area, location_area, count_area] = AppLayout::form_fields(area);
    let max = state.session.account().tier.max_count();
    let count_title = format!(" Count (max {}) ", max);

    let fields = [
        (keyword_area, " Keyword ", state.keyword.to_string(), Focus::Keyword),
        (location_area, " Location ", state.location.to_string(), Focus::Location),
        (count_area, count_title.as_str(), state.count.to_string(), Focus::Count),
    ];

    for (field_area, title, value, focus) in fields {
        let focused = state.focus == focus && state.prompt.is_none();
        let mut text = value;
        if focused {
            text.push('▏');
        }
        let paragraph = Paragraph::new(text).block(
            Block::default().borders(Borders::ALL).border_style(border_style(focused)).title(title),
        );
        frame.render_widget(paragraph, field_area);
    }
}

fn render_usage(frame: &mut Frame, area: Rect, session: &Session) {
    let [account_area, daily_area, monthly_area] = AppLayout::usage_panels(area);
    let account = session.account();
    let usage = session.usage();
    let now = Utc::now();

    let tier_style = if account.premium() {
        Style::default().fg(EMERALD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BRIGHT)
    };
    let mut spans = vec![Span::styled(account.tier.as_str().to_uppercase(), tier_style)];
    if account.premium() {
        spans.push(Span::styled(" premium", Style::default().fg(EMERALD)));
    }
    spans.push(Span::styled(format!("  {}", account.masked_key()), Style::default().fg(MUTED)));
    let account_info = Paragraph::new(Line::from(spans)).block(
        Block::default().borders(Borders::ALL).border_style(border_style(false)).title(" Account "),
    );
    frame.render_widget(account_info, account_area);

    let gauges = [
        (daily_area, " Today ", usage.daily, usage.daily_limit, usage.daily_percent(), usage.reset_daily),
        (
            monthly_area,
            " This month ",
            usage.monthly,
            usage.monthly_limit,
            usage.monthly_percent(),
            usage.reset_monthly,
        ),
    ];
    for (gauge_area, title, used, limit, percent, reset) in gauges {
        let mut label = format!("{}/{}", used, limit);
        if let Some(countdown) = format_reset(reset.as_ref(), &now) {
            label.push_str(&format!(" · resets {}", countdown));
        }
        let color = if percent >= 100 { RED } else if percent >= 80 { AMBER } else { EMERALD };
        let gauge = Gauge::default()
            .block(
                Block::default().borders(Borders::ALL).border_style(border_style(false)).title(title),
            )
            .gauge_style(Style::default().fg(color).bg(STATUS_BG))
            .percent(percent)
            .label(label);
        frame.render_widget(gauge, gauge_area);
    }
}

fn render_results(frame: &mut Frame, area: Rect, state: &RenderState) {
    let session = state.session;
    let total = session.results().len();
    let focused = state.focus == Focus::Results && state.prompt.is_none();
    let title = if total == 0 {
        " Results ".to_string()
    } else {
        format!(
            " Results: {} | {} | {} per page ",
            session.counts().summary(),
            session.pager().label(total),
            session.pager().page_size()
        )
    };
    let block =
        Block::default().borders(Borders::ALL).border_style(border_style(focused)).title(title);

    if total == 0 {
        let hint = if session.last_query().is_some() {
            NO_LEADS_MESSAGE
        } else {
            "Enter a keyword and location, then press Enter to search."
        };
        let paragraph = Paragraph::new(hint).style(Style::default().fg(MUTED)).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(LEAD_COLUMNS.iter().map(|c| Cell::from(*c)))
        .style(Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD));

    let rows = session.page_rows().iter().enumerate().map(|(idx, lead)| {
        let cells = lead.cells().map(|cell| truncate_chars(&sanitize_cell(&cell), MAX_CELL_CHARS));
        let style = if idx == state.selected_row && focused {
            Style::default().fg(BRIGHT).bg(EMERALD).add_modifier(Modifier::BOLD)
        } else if idx == state.selected_row {
            Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Percentage(22),
        Constraint::Percentage(20),
        Constraint::Percentage(14),
        Constraint::Percentage(16),
        Constraint::Percentage(14),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_detail(frame: &mut Frame, area: Rect, lead: Option<&Lead>) {
    let content = if let Some(lead) = lead {
        let lines: Vec<Line> = LEAD_COLUMNS
            .iter()
            .zip(lead.cells())
            .map(|(label, value)| {
                let value = sanitize_cell(&value);
                Line::from(vec![
                    Span::styled(format!("{}: ", label), Style::default().fg(MUTED)),
                    Span::raw(if value.is_empty() { "-".to_string() } else { value }),
                ])
            })
            .collect();
        Text::from(lines)
    } else {
        Text::from("No lead selected")
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default().borders(Borders::ALL).border_style(border_style(false)).title(" Lead "),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, area: Rect, session: &Session) {
    let now = Utc::now();
    let items: Vec<ListItem> = session
        .history()
        .map(|entry| {
            let content = format!(
                "{} in {} · {} · {}",
                sanitize_cell(&entry.keyword),
                sanitize_cell(&entry.location),
                entry.result_count,
                format_timestamp(&entry.timestamp, &now)
            );
            ListItem::new(content).style(Style::default().fg(MUTED))
        })
        .collect();

    let list = List::new(items).block(
        Block::default().borders(Borders::ALL).border_style(border_style(false)).title(" History "),
    );

    frame.render_widget(list, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(query) = state.searching {
        (
            format!(" Searching for '{}' in '{}'... ", query.keyword, query.location),
            Style::default().fg(AMBER).bg(STATUS_BG),
        )
    } else if let Some(message) = state.status_message {
        let color = match message.message_type {
            MessageType::Success => EMERALD,
            MessageType::Warning => AMBER,
            MessageType::Error => RED,
        };
        (format!(" {} ", message.text), Style::default().fg(color).bg(STATUS_BG))
    } else if state.prompt.is_some() {
        (" Enter: submit | Esc: cancel ".to_string(), Style::default().fg(BRIGHT).bg(STATUS_BG))
    } else {
        let hints = [
            "Enter: search",
            "Tab: focus",
            "←/→: page",
            "^T: page size",
            "^E/^W: export all/email",
            "^L: license",
            "^K: login",
            "^O: logout",
            "^R: status",
            "^C: quit",
        ];
        (format!(" {} ", hints.join(" | ")), Style::default().fg(BRIGHT).bg(STATUS_BG))
    };

    let paragraph = Paragraph::new(status_text).style(style);

    frame.render_widget(paragraph, area);
}

fn render_prompt(frame: &mut Frame, prompt: &Prompt) {
    let area = AppLayout::popup(frame.area(), 60, 3);
    let masked = "•".repeat(prompt.input.chars().count());
    let paragraph = Paragraph::new(format!("{}▏", masked)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(EMERALD))
            .title(prompt.kind.title()),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::api::ScrapeResponse;
    use crate::models::{Tier, UsageState};
    use crate::tui::app::PromptKind;

    fn session_with_results(total: usize) -> Session {
        let mut session = Session::new("free-key-0001", 10);
        let query = session.begin_search("dentist", "Berlin", 10).unwrap();
        let results = (0..total)
            .map(|i| Lead {
                name: format!("\x1b[31mPraxis {}\x1b[0m", i),
                email: (i % 2 == 0).then(|| format!("info{}@praxis.de", i)),
                hours: Some("Mon-Fri\n9-17".to_string()),
                rating: Some(4.5),
                ..Default::default()
            })
            .collect();
        let usage = UsageState { daily: 2, daily_limit: 3, monthly: 10, monthly_limit: 90, ..Default::default() };
        session
            .complete_search(query, Ok(ScrapeResponse { results, usage: Some(usage), stats: None }))
            .unwrap();
        session
    }

    fn state<'a>(session: &'a Session) -> RenderState<'a> {
        RenderState {
            session,
            keyword: "dentist",
            location: "Berlin",
            count: 10,
            focus: Focus::Results,
            selected_row: 0,
            prompt: None,
            status_message: None,
            searching: None,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_ui_with_results() {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        let session = session_with_results(12);

        terminal.draw(|f| render_ui(f, &state(&session))).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("Praxis 0"));
        assert!(!text.contains("\x1b"));
    }

    #[test]
    fn test_render_ui_empty_session() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let session = Session::new("free-key-0001", 10);

        terminal.draw(|f| render_ui(f, &state(&session))).unwrap();

        assert!(buffer_text(&terminal).contains("Enter a keyword and location"));
    }

    #[test]
    fn test_render_ui_with_prompt_overlay() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let session = Session::new("free-key-0001", 10);
        let prompt = Prompt { kind: PromptKind::License, input: "secret".to_string() };
        let mut render_state = state(&session);
        render_state.prompt = Some(&prompt);

        terminal.draw(|f| render_ui(f, &render_state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Activate license"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_render_status_bar_while_searching() {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        let session = Session::new("free-key-0001", 10);
        let query = SearchQuery::from_form("gym", "Hamburg", 10, Tier::Free).unwrap();
        let mut render_state = state(&session);
        render_state.searching = Some(&query);

        terminal.draw(|f| render_status_bar(f, f.area(), &render_state)).unwrap();

        assert!(buffer_text(&terminal).contains("Searching for 'gym' in 'Hamburg'..."));
    }

    #[test]
    fn test_render_status_bar_message() {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        let session = Session::new("free-key-0001", 10);
        let message = StatusMessage {
            text: "Daily limit reached (3 of 3 used)".to_string(),
            message_type: MessageType::Error,
            expires_at: Instant::now() + Duration::from_secs(5),
        };
        let mut render_state = state(&session);
        render_state.status_message = Some(&message);

        terminal.draw(|f| render_status_bar(f, f.area(), &render_state)).unwrap();

        assert!(buffer_text(&terminal).contains("Daily limit reached"));
    }

    #[test]
    fn test_render_usage_shows_mirrored_counts() {
        let mut terminal = Terminal::new(TestBackend::new(120, 3)).unwrap();
        let session = session_with_results(1);

        terminal.draw(|f| render_usage(f, f.area(), &session)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("FREE"));
        assert!(text.contains("*********0001"));
        assert!(text.contains("2/3"));
        assert!(text.contains("10/90"));
    }

    #[test]
    fn test_render_detail_no_lead() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        terminal.draw(|f| render_detail(f, f.area(), None)).unwrap();

        assert!(buffer_text(&terminal).contains("No lead selected"));
    }

    #[test]
    fn test_render_detail_collapses_multiline_hours() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let lead = Lead {
            name: "Cafe".to_string(),
            hours: Some("Mon\nTue".to_string()),
            ..Default::default()
        };

        terminal.draw(|f| render_detail(f, f.area(), Some(&lead))).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Hours: Mon Tue"));
        assert!(text.contains("Email: -"));
    }

    #[test]
    fn test_render_history_lists_searches() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let session = session_with_results(3);

        terminal.draw(|f| render_history(f, f.area(), &session)).unwrap();

        assert!(buffer_text(&terminal).contains("dentist in Berlin · 3 · just now"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        let session = session_with_results(5);

        // Just verify it doesn't panic
        terminal.draw(|f| render_ui(f, &state(&session))).unwrap();
    }
}
