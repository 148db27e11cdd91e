use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions for the interactive UI
pub struct AppLayout {
    pub form_area: Rect,
    pub usage_area: Rect,
    pub results_area: Rect,
    pub detail_area: Rect,
    pub history_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Top to bottom:
    /// - Form row: keyword, location, count (3 rows)
    /// - Account and usage panel (3 rows)
    /// - Results table (65% width) beside detail and history (35% width)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(vertical_chunks[2]);

        let side_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(horizontal_chunks[1]);

        Self {
            form_area: vertical_chunks[0],
            usage_area: vertical_chunks[1],
            results_area: horizontal_chunks[0],
            detail_area: side_chunks[0],
            history_area: side_chunks[1],
            status_area: vertical_chunks[3],
        }
    }

    /// The three form fields: keyword and location share the width, count is fixed
    pub fn form_fields(form_area: Rect) -> [Rect; 3] {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(40),
                Constraint::Percentage(15),
            ])
            .split(form_area);
        [chunks[0], chunks[1], chunks[2]]
    }

    /// Account summary beside the daily and monthly gauges
    pub fn usage_panels(usage_area: Rect) -> [Rect; 3] {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(35),
                Constraint::Percentage(35),
            ])
            .split(usage_area);
        [chunks[0], chunks[1], chunks[2]]
    }

    /// Centered box of `width` x `height`, shrunk to fit `area`
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}
