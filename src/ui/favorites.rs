//! Favorites sidebar rendering

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{border_style, colors};
use crate::app::{App, Focus};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Favorites;
    let block = Block::default()
        .title(" Favorites ")
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let favorites = app.favorites();
    let lines: Vec<Line> = if favorites.is_empty() {
        vec![
            Line::from(Span::styled("No favorites yet", Style::default().fg(colors::SECONDARY))),
            Line::from(Span::styled(
                "Ctrl+F to add",
                Style::default().fg(colors::SECONDARY),
            )),
        ]
    } else {
        favorites
            .iter()
            .enumerate()
            .map(|(i, city)| {
                let selected = focused && i == app.selected_favorite;
                let (marker, style) = if selected {
                    (
                        "> ",
                        Style::default()
                            .fg(colors::KEY)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    ("  ", Style::default().fg(colors::PRIMARY))
                };
                Line::from(Span::styled(format!("{}{}", marker, city), style))
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
