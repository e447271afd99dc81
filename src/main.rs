//! Weather Dashboard - current conditions and forecasts from the terminal
//!
//! With a city argument, prints a weather report and exits. With a favorites
//! command, edits or lists the favorites file. With no arguments, opens the
//! interactive dashboard.

mod app;
mod ui;

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weatherdash::cli::{Cli, Mode, StartupConfig};
use weatherdash::config::Config;
use weatherdash::data::Provider;
use weatherdash::display::render_report;
use weatherdash::favorites::Favorites;
use weatherdash::units::TemperatureUnit;
use weatherdash::WeatherService;

use app::App;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Log file name inside the cache directory
const LOG_FILE: &str = "weatherdash.log";

/// Sets up logging with an environment-based filter (`RUST_LOG`, default `warn`)
///
/// The dashboard owns the terminal, so it logs to a file; every other mode
/// logs to stderr. The returned guard flushes the file writer on drop.
fn init_tracing(mode: &Mode) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if *mode == Mode::Dashboard {
        let log_dir = Config::log_dir()?;
        std::fs::create_dir_all(&log_dir).ok()?;
        let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .init();
        return Some(guard);
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
    None
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let startup = StartupConfig::from_cli(&cli)?;
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli, &startup);

    let _guard = init_tracing(&startup.mode);
    info!(mode = ?startup.mode, "weatherdash starting");

    let favorites = Favorites::load(config.favorites_store());

    if !startup.mode.needs_provider() {
        return edit_favorites(&startup.mode, favorites);
    }

    let mut service = WeatherService::new(config.provider()?, config.cache(), favorites);
    match startup.mode {
        Mode::Report(city) => {
            let snapshot = service.fetch_weather(&city, Utc::now()).await?;
            if startup.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render_report(&snapshot, config.units, Local::now().date_naive()));
            }
            Ok(())
        }
        Mode::ReportFavorites => report_favorites(&mut service, config.units, startup.json).await,
        _ => run_dashboard(App::new(service, config.units)),
    }
}

/// Runs the favorites commands, which never touch the network
fn edit_favorites(mode: &Mode, mut favorites: Favorites) -> Result<()> {
    match mode {
        Mode::ListFavorites => {
            for city in favorites.list() {
                println!("{}", city);
            }
        }
        Mode::AddFavorite(city) => {
            if favorites.add(city) {
                println!("Added {} to favorites", city);
            } else {
                println!("{} is already a favorite", city);
            }
        }
        Mode::RemoveFavorite(city) => {
            if favorites.remove(city) {
                println!("Removed {} from favorites", city);
            } else {
                println!("{} is not a favorite", city);
            }
        }
        Mode::Dashboard | Mode::Report(_) | Mode::ReportFavorites => {}
    }
    Ok(())
}

/// Prints a report for every favorite; fails if any city could not be fetched
async fn report_favorites(
    service: &mut WeatherService<Provider>,
    units: TemperatureUnit,
    json: bool,
) -> Result<()> {
    let cities = service.list_favorites().to_vec();
    if cities.is_empty() {
        eprintln!("No favorites yet. Add one with --add <CITY>");
        return Ok(());
    }

    let results = service.fetch_many(&cities, Utc::now()).await;
    let today = Local::now().date_naive();
    let mut snapshots = Vec::new();
    let mut failed = 0;
    for (_, result) in results {
        match result {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                eprintln!("{}", e);
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        let reports: Vec<String> = snapshots
            .iter()
            .map(|snapshot| render_report(snapshot, units, today))
            .collect();
        print!("{}", reports.join("\n"));
    }

    if failed > 0 {
        return Err(format!("{} of {} cities could not be fetched", failed, cities.len()).into());
    }
    Ok(())
}

/// Runs the interactive dashboard until the user quits
fn run_dashboard(mut app: App) -> Result<()> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Apply finished lookups before drawing
        app.poll_fetches(Utc::now());

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            info!("weatherdash exiting");
            return Ok(());
        }
    }
}
