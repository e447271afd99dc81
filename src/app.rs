//! Application state management for the weather dashboard
//!
//! This module contains the interactive application state: the search box,
//! the displayed snapshot, the favorites selection and keyboard handling.
//! Lookups that miss the cache run on background tasks; their results are
//! applied here, on the UI loop, before anything on screen changes.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use weatherdash::data::{Provider, WeatherSnapshot};
use weatherdash::units::TemperatureUnit;
use weatherdash::worker::{FetchMessage, FetchWorker};
use weatherdash::WeatherService;

/// Message shown when a lookup fails
const FETCH_FAILED_MESSAGE: &str =
    "Could not fetch weather data. Please check the city name and try again.";

/// Which pane receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Typing into the search box
    Search,
    /// Navigating the favorites sidebar
    Favorites,
}

/// Main application struct managing state and data
pub struct App {
    /// Pane receiving keyboard input
    pub focus: Focus,
    /// Text typed into the search box
    pub search_input: String,
    /// Status line text
    pub status: String,
    /// Active display unit
    pub unit: TemperatureUnit,
    /// Snapshot currently displayed
    pub current: Option<WeatherSnapshot>,
    /// Index of the highlighted favorite
    pub selected_favorite: usize,
    /// Modal error message, dismissed by any key
    pub error_popup: Option<String>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// When the displayed snapshot was requested
    shown_requested_at: Option<DateTime<Utc>>,
    service: WeatherService<Provider>,
    worker: FetchWorker,
}

impl App {
    /// Creates a new App instance around a weather service
    pub fn new(service: WeatherService<Provider>, unit: TemperatureUnit) -> Self {
        Self {
            focus: Focus::Search,
            search_input: String::new(),
            status: "Ready".to_string(),
            unit,
            current: None,
            selected_favorite: 0,
            error_popup: None,
            show_help: false,
            should_quit: false,
            shown_requested_at: None,
            service,
            worker: FetchWorker::new(),
        }
    }

    /// Favorite cities in display order
    pub fn favorites(&self) -> &[String] {
        self.service.list_favorites()
    }

    /// Whether `city` is in the favorites
    pub fn is_favorite(&self, city: &str) -> bool {
        self.service.is_favorite(city)
    }

    /// Whether a background lookup is still running
    pub fn is_fetching(&self) -> bool {
        self.worker.in_flight() > 0
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Enter` (search): Look up the typed city
    /// - `Tab`: Switch between search box and favorites
    /// - `F2` / `Ctrl+T`: Toggle °C/°F
    /// - `Ctrl+F`: Add the typed city to favorites
    /// - `Up`/`k`, `Down`/`j` (favorites): Move selection
    /// - `Enter` (favorites): Show the selected city
    /// - `d`/`Delete` (favorites): Remove the selected city
    /// - `?` (favorites): Toggle help
    /// - `Esc` (search) / `q` (favorites) / `Ctrl+C`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Error popup intercepts the next key
        if self.error_popup.is_some() {
            self.error_popup = None;
            return;
        }

        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        match key_event.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('t') if ctrl => {
                self.toggle_unit();
                return;
            }
            KeyCode::F(2) => {
                self.toggle_unit();
                return;
            }
            KeyCode::Char('f') if ctrl => {
                self.add_favorite();
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => match key_event.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Enter => {
                    self.search(Utc::now());
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                }
                KeyCode::Char(c) if !ctrl => {
                    self.search_input.push(c);
                }
                _ => {}
            },
            Focus::Favorites => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.focus = Focus::Search;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    self.show_selected_favorite(Utc::now());
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    self.remove_selected_favorite();
                }
                KeyCode::Char('u') => {
                    self.toggle_unit();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Looks up the city in the search box
    ///
    /// A fresh cache entry is shown immediately; otherwise a background
    /// lookup starts and the current display stays until it completes.
    pub fn search(&mut self, now: DateTime<Utc>) {
        let city = self.search_input.trim().to_string();
        if city.is_empty() {
            self.error_popup = Some("Please enter a city name".to_string());
            return;
        }

        if let Some(snapshot) = self.service.cached(&city, now) {
            self.status = format!("Weather data updated for {}", city);
            self.show(snapshot, now);
            return;
        }

        self.status = format!("Fetching weather data for {}...", city);
        self.service.spawn_lookup(&mut self.worker, &city, now);
    }

    /// Shows the highlighted favorite
    ///
    /// Any cached snapshot is shown as-is, however old; a city never fetched
    /// in this session is searched for.
    pub fn show_selected_favorite(&mut self, now: DateTime<Utc>) {
        let Some(city) = self.favorites().get(self.selected_favorite).cloned() else {
            return;
        };
        self.search_input = city.clone();

        match self.service.last_known(&city, now) {
            Some(cached) => {
                self.show(cached.data, now);
                self.status = format!("Showing cached weather for {}", city);
            }
            None => self.search(now),
        }
    }

    /// Applies every completed background lookup
    pub fn poll_fetches(&mut self, now: DateTime<Utc>) {
        while let Some(message) = self.worker.try_recv() {
            self.handle_fetch(message, now);
        }
    }

    /// Applies one completed lookup to the cache and the display
    ///
    /// The cache always takes the result. The display only changes when the
    /// lookup was requested no earlier than what is on screen, so a slow
    /// older lookup cannot replace a newer view. On failure the previous
    /// display is kept.
    pub fn handle_fetch(&mut self, message: FetchMessage, now: DateTime<Utc>) {
        let city = message.city.clone();
        let requested_at = message.requested_at;
        match self.service.apply(message, now) {
            Ok(snapshot) => {
                if self.shown_requested_at.is_some_and(|shown| requested_at < shown) {
                    debug!(city = %city, "ignoring superseded lookup");
                    return;
                }
                self.status = format!("Weather data updated for {}", city);
                self.show(snapshot, requested_at);
            }
            Err(_) => {
                self.status = format!("Error fetching weather data for {}", city);
                self.error_popup = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
    }

    fn show(&mut self, snapshot: WeatherSnapshot, requested_at: DateTime<Utc>) {
        self.current = Some(snapshot);
        self.shown_requested_at = Some(requested_at);
    }

    /// Switches between °C and °F
    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggle();
    }

    /// Adds the typed city to the favorites
    pub fn add_favorite(&mut self) {
        let city = self.search_input.trim().to_string();
        if self.service.add_favorite(&city) {
            self.status = format!("Added {} to favorites", city);
        }
    }

    /// Removes the highlighted favorite
    pub fn remove_selected_favorite(&mut self) {
        let Some(city) = self.favorites().get(self.selected_favorite).cloned() else {
            return;
        };
        if self.service.remove_favorite(&city) {
            self.status = format!("Removed {} from favorites", city);
        }
        let count = self.favorites().len();
        if self.selected_favorite >= count {
            self.selected_favorite = count.saturating_sub(1);
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Favorites,
            Focus::Favorites => Focus::Search,
        };
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.favorites().len();
        if count == 0 {
            return;
        }
        if self.selected_favorite == 0 {
            self.selected_favorite = count - 1;
        } else {
            self.selected_favorite -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.favorites().len();
        if count == 0 {
            return;
        }
        self.selected_favorite = (self.selected_favorite + 1) % count;
    }

    #[cfg(test)]
    pub async fn wait_for_fetch(&mut self, now: DateTime<Utc>) {
        if let Some(message) = self.worker.recv().await {
            self.handle_fetch(message, now);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::create_test_app;
    use super::*;
    use chrono::Duration;
    use weatherdash::data::DemoProvider;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_new_app_defaults() {
        let (app, _temp_dir) = create_test_app(&[]);
        assert_eq!(app.focus, Focus::Search);
        assert_eq!(app.status, "Ready");
        assert_eq!(app.unit, TemperatureUnit::Celsius);
        assert!(app.current.is_none());
        assert!(!app.should_quit);
        assert!(!app.is_fetching());
    }

    #[test]
    fn test_typing_edits_search_input() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        type_text(&mut app, "Parix");
        app.handle_key(key_event(KeyCode::Backspace));
        type_text(&mut app, "s");
        assert_eq!(app.search_input, "Paris");
    }

    #[test]
    fn test_empty_search_shows_error_popup() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        type_text(&mut app, "   ");

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.error_popup.as_deref(), Some("Please enter a city name"));
        assert!(!app.is_fetching());

        // Any key dismisses the popup without being handled further
        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(app.error_popup.is_none());
        assert_eq!(app.search_input, "   ");
    }

    #[tokio::test]
    async fn test_search_fetches_in_background_then_displays() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        type_text(&mut app, " Paris ");

        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.is_fetching());
        assert_eq!(app.status, "Fetching weather data for Paris...");
        assert!(app.current.is_none(), "display changes only when the result arrives");

        app.wait_for_fetch(Utc::now()).await;

        assert!(!app.is_fetching());
        assert_eq!(app.status, "Weather data updated for Paris");
        assert_eq!(app.current.as_ref().unwrap().city, "Paris");
    }

    #[tokio::test]
    async fn test_repeat_search_uses_cache() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.search_input = "Rome".to_string();
        app.search(Utc::now());
        app.wait_for_fetch(Utc::now()).await;
        app.current = None;

        app.search(Utc::now());

        assert!(!app.is_fetching(), "fresh entry should not start a lookup");
        assert_eq!(app.current.as_ref().unwrap().city, "Rome");
    }

    #[tokio::test]
    async fn test_search_after_window_fetches_again() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        let now = Utc::now();
        app.search_input = "Rome".to_string();
        app.search(now);
        app.wait_for_fetch(now).await;

        app.search(now + Duration::seconds(3601));

        assert!(app.is_fetching());
    }

    #[tokio::test]
    async fn test_older_lookup_does_not_replace_newer_view() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        let t0 = Utc::now();
        let provider = DemoProvider::new();

        let newer = FetchMessage {
            city: "Rome".to_string(),
            requested_at: t0 + Duration::seconds(5),
            result: Ok(provider.snapshot("Rome", t0 + Duration::seconds(5))),
        };
        let older = FetchMessage {
            city: "Paris".to_string(),
            requested_at: t0,
            result: Ok(provider.snapshot("Paris", t0)),
        };

        app.handle_fetch(newer, t0 + Duration::seconds(6));
        app.handle_fetch(older, t0 + Duration::seconds(7));

        assert_eq!(app.current.as_ref().unwrap().city, "Rome");
        assert_eq!(app.status, "Weather data updated for Rome");
        // The older result still reaches the cache
        app.search_input = "Paris".to_string();
        app.search(t0 + Duration::seconds(8));
        assert!(!app.is_fetching());
        assert_eq!(app.current.as_ref().unwrap().city, "Paris");
    }

    #[test]
    fn test_is_favorite_reflects_list() {
        let (app, _temp_dir) = create_test_app(&["Paris"]);
        assert!(app.is_favorite("Paris"));
        assert!(!app.is_favorite("Rome"));
    }

    #[test]
    fn test_toggle_unit_keys() {
        let (mut app, _temp_dir) = create_test_app(&[]);

        app.handle_key(key_event(KeyCode::F(2)));
        assert_eq!(app.unit, TemperatureUnit::Fahrenheit);

        app.handle_key(ctrl('t'));
        assert_eq!(app.unit, TemperatureUnit::Celsius);
        assert!(app.search_input.is_empty(), "ctrl keys are not typed");
    }

    #[test]
    fn test_ctrl_f_adds_typed_city_once() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        type_text(&mut app, "Paris");

        app.handle_key(ctrl('f'));
        app.handle_key(ctrl('f'));

        assert_eq!(app.favorites(), ["Paris"]);
        assert_eq!(app.status, "Added Paris to favorites");
    }

    #[test]
    fn test_ctrl_f_ignores_empty_search() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.handle_key(ctrl('f'));
        assert!(app.favorites().is_empty());
    }

    #[test]
    fn test_tab_switches_focus() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Favorites);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Search);
    }

    #[test]
    fn test_favorites_selection_wraps() {
        let (mut app, _temp_dir) = create_test_app(&["Paris", "Rome", "Oslo"]);
        app.focus = Focus::Favorites;

        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.selected_favorite, 2);
        app.handle_key(key_event(KeyCode::Char('j')));
        assert_eq!(app.selected_favorite, 0);
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_favorite, 1);
    }

    #[test]
    fn test_remove_selected_favorite_clamps_selection() {
        let (mut app, _temp_dir) = create_test_app(&["Paris", "Rome"]);
        app.focus = Focus::Favorites;
        app.selected_favorite = 1;

        app.handle_key(key_event(KeyCode::Char('d')));

        assert_eq!(app.favorites(), ["Paris"]);
        assert_eq!(app.selected_favorite, 0);
        assert_eq!(app.status, "Removed Rome from favorites");
    }

    #[test]
    fn test_remove_with_no_favorites_is_noop() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.focus = Focus::Favorites;
        app.handle_key(key_event(KeyCode::Delete));
        assert!(app.favorites().is_empty());
        assert_eq!(app.selected_favorite, 0);
    }

    #[tokio::test]
    async fn test_enter_on_unfetched_favorite_searches() {
        let (mut app, _temp_dir) = create_test_app(&["Lima"]);
        app.focus = Focus::Favorites;

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.search_input, "Lima");
        assert!(app.is_fetching());
        app.wait_for_fetch(Utc::now()).await;
        assert_eq!(app.current.as_ref().unwrap().city, "Lima");
    }

    #[tokio::test]
    async fn test_enter_on_stale_favorite_shows_cached_data() {
        let (mut app, _temp_dir) = create_test_app(&["Lima"]);
        let then = Utc::now() - Duration::hours(3);
        app.search_input = "Lima".to_string();
        app.search(then);
        app.wait_for_fetch(then).await;
        app.current = None;

        app.show_selected_favorite(Utc::now());

        assert!(!app.is_fetching());
        assert_eq!(app.current.as_ref().unwrap().fetched_at, then);
        assert_eq!(app.status, "Showing cached weather for Lima");
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);

        let (mut app, _temp_dir) = create_test_app(&[]);
        app.focus = Focus::Favorites;
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _temp_dir) = create_test_app(&[]);
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_in_search_is_typed() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.search_input, "q");
    }

    #[test]
    fn test_help_overlay_toggle() {
        let (mut app, _temp_dir) = create_test_app(&[]);
        app.focus = Focus::Favorites;

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        // Keys other than close are swallowed
        app.handle_key(key_event(KeyCode::Char('d')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert_eq!(app.focus, Focus::Favorites);
    }
}
