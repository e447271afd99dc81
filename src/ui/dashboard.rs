//! Weather panel rendering
//!
//! Current conditions for the displayed city followed by a row of daily
//! forecast cards.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use weatherdash::data::{ForecastDay, WeatherSnapshot};
use weatherdash::display::{
    condition_icon, format_forecast_temperature, format_humidity, format_long_date, format_temperature,
    format_weekday, format_wind, icon_for_code,
};
use weatherdash::units::TemperatureUnit;

use super::colors;
use crate::app::App;

/// Color for temperature (warmer = more red, cooler = more blue)
fn temperature_color(celsius: f64) -> Color {
    if celsius >= 30.0 {
        Color::Red
    } else if celsius >= 25.0 {
        Color::LightRed
    } else if celsius >= 20.0 {
        Color::Yellow
    } else if celsius >= 15.0 {
        Color::Green
    } else if celsius >= 10.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Weather ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SECONDARY));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &app.current {
        Some(snapshot) => render_snapshot(frame, app, snapshot, inner),
        None => render_placeholder(frame, app.is_fetching(), inner),
    }
}

fn render_placeholder(frame: &mut Frame, fetching: bool, area: Rect) {
    let text = if fetching {
        "Loading..."
    } else {
        "Search for a city to see its weather"
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(colors::SECONDARY))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_snapshot(frame: &mut Frame, app: &App, snapshot: &WeatherSnapshot, area: Rect) {
    let unit = app.unit;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Current conditions
            Constraint::Min(6),    // Forecast
        ])
        .split(area);

    let mut title = vec![Span::styled(
        snapshot.city.clone(),
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    )];
    if app.is_favorite(&snapshot.city) {
        title.push(Span::styled(" \u{2605}", Style::default().fg(colors::KEY))); // ★
    }
    if app.is_fetching() {
        title.push(Span::styled("  (updating...)", Style::default().fg(colors::SECONDARY)));
    }

    let lines = vec![
        Line::from(title),
        Line::from(Span::styled(
            format_long_date(Local::now().date_naive()),
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{} ", condition_icon(snapshot.condition()))),
            Span::styled(
                format_temperature(snapshot.temperature, unit),
                Style::default()
                    .fg(temperature_color(snapshot.temperature))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(snapshot.description.clone(), Style::default().fg(colors::PRIMARY)),
        ]),
        Line::from(format_humidity(snapshot.humidity)),
        Line::from(format_wind(snapshot.wind_speed)),
    ];

    frame.render_widget(Paragraph::new(lines), chunks[0]);
    render_forecast(frame, &snapshot.forecast, unit, chunks[1]);
}

fn render_forecast(frame: &mut Frame, forecast: &[ForecastDay], unit: TemperatureUnit, area: Rect) {
    if forecast.is_empty() {
        return;
    }

    let block = Block::default()
        .title(format!(" {}-Day Forecast ", forecast.len()))
        .borders(Borders::TOP)
        .border_style(Style::default().fg(colors::HEADER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let constraints: Vec<Constraint> = forecast
        .iter()
        .map(|_| Constraint::Ratio(1, forecast.len() as u32))
        .collect();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (day, card) in forecast.iter().zip(cards.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                format_weekday(day.date),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(icon_for_code(&day.icon_code)),
            Line::from(Span::styled(
                format_forecast_temperature(day.high_temp, unit),
                Style::default().fg(temperature_color(day.high_temp)),
            )),
            Line::from(Span::styled(
                format_forecast_temperature(day.low_temp, unit),
                Style::default().fg(colors::SECONDARY),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *card);
    }
}
