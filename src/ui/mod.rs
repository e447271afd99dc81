//! UI rendering module for the weather dashboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. The screen is split into a
//! search bar, a favorites sidebar, the weather panel and a status line.

pub mod dashboard;
pub mod favorites;
pub mod help_overlay;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};

/// Width of the favorites sidebar
const SIDEBAR_WIDTH: u16 = 24;

/// Color palette shared by the dashboard panes
pub(crate) mod colors {
    use ratatui::style::Color;

    /// Section headers and focused borders
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::DarkGray;
    /// Key hints
    pub const KEY: Color = Color::Yellow;
    /// Errors
    pub const ERROR: Color = Color::Red;
}

/// Border style for a pane, highlighted when it has focus
pub(crate) fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(colors::HEADER)
    } else {
        Style::default().fg(colors::SECONDARY)
    }
}

/// Renders the whole dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(10),   // Sidebar + weather
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_search_bar(frame, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
        .split(rows[1]);

    favorites::render(frame, app, columns[0]);
    dashboard::render(frame, app, columns[1]);
    render_status_line(frame, app, rows[2]);

    if app.show_help {
        help_overlay::render(frame);
    }
    if let Some(message) = &app.error_popup {
        render_error_popup(frame, message);
    }
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let mut spans = vec![Span::styled(
        app.search_input.clone(),
        Style::default().fg(colors::PRIMARY),
    )];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(colors::KEY)));
    }

    let block = Block::default()
        .title(" Search city (Enter) ")
        .title(Title::from(format!(" Units: {} (F2) ", app.unit)).alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.focus {
        Focus::Search => "Tab favorites | Ctrl+F save | Esc quit",
        Focus::Favorites => "Tab search | d remove | ? help | q quit",
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(hints.len() as u16 + 1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(app.status.as_str()).style(Style::default().fg(colors::PRIMARY)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(hints)
            .style(Style::default().fg(colors::SECONDARY))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

/// Renders a modal error message on top of the dashboard
fn render_error_popup(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(colors::PRIMARY))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(colors::SECONDARY),
        )),
    ];

    let block = Block::default()
        .title(Span::styled(
            " Error ",
            Style::default().fg(colors::ERROR).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
