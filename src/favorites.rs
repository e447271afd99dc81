//! Favorite cities and their flat-file persistence
//!
//! The favorites file is plain UTF-8 text with one city per line, no header
//! and no escaping. Invalid UTF-8 is read lossily. Persistence failures are logged and otherwise ignored:
//! the in-memory list stays authoritative for the session.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Default favorites file, relative to the working directory
pub const DEFAULT_FAVORITES_FILE: &str = "favorites.txt";

/// Errors from reading or writing the favorites file
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("favorites file I/O failed: {0}")]
    IoFailure(#[from] io::Error),
}

/// Reads and writes the favorites file
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every city in file order
    ///
    /// A missing file is an empty list, not an error. Bytes that are not valid
    /// UTF-8 are replaced rather than ending the read, so one bad line never
    /// hides the lines after it. On an I/O failure the error is returned
    /// together with the cities read so far.
    pub fn try_load(&self) -> Result<Vec<String>, (Vec<String>, PersistenceError)> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err((Vec::new(), e.into())),
        };

        let mut cities = Vec::new();
        for line in BufReader::new(file).split(b'\n') {
            match line {
                Ok(bytes) => {
                    let line = String::from_utf8_lossy(&bytes);
                    let city = line.trim();
                    if !city.is_empty() {
                        cities.push(city.to_string());
                    }
                }
                Err(e) => return Err((cities, e.into())),
            }
        }
        Ok(cities)
    }

    /// Like `try_load`, but logs failures and returns whatever was read
    pub fn load(&self) -> Vec<String> {
        match self.try_load() {
            Ok(cities) => cities,
            Err((partial, e)) => {
                warn!(path = %self.path.display(), error = %e, "failed to load favorites");
                partial
            }
        }
    }

    /// Overwrites the file with one city per line, in order
    pub fn try_save(&self, cities: &[String]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.path)?;
        for city in cities {
            writeln!(file, "{}", city)?;
        }
        file.flush()?;
        Ok(())
    }

    /// Like `try_save`, but logs failures instead of returning them
    pub fn save(&self, cities: &[String]) {
        if let Err(e) = self.try_save(cities) {
            warn!(path = %self.path.display(), error = %e, "failed to save favorites");
        }
    }
}

/// Ordered, duplicate-free list of favorite cities, mirrored to disk
#[derive(Debug, Clone)]
pub struct Favorites {
    cities: Vec<String>,
    store: FavoritesStore,
}

impl Favorites {
    /// Loads the list from `store`
    pub fn load(store: FavoritesStore) -> Self {
        let cities = store.load();
        info!(count = cities.len(), path = %store.path().display(), "loaded favorites");
        Self { cities, store }
    }

    /// Cities in display order
    pub fn list(&self) -> &[String] {
        &self.cities
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    /// Appends `city` and saves
    ///
    /// Returns `false` without touching the file when `city` is empty or
    /// already present (exact match).
    pub fn add(&mut self, city: &str) -> bool {
        if city.is_empty() || self.contains(city) {
            return false;
        }
        self.cities.push(city.to_string());
        self.store.save(&self.cities);
        info!(city, "added favorite");
        true
    }

    /// Removes every entry equal to `city` and saves
    ///
    /// Returns `false` and leaves the file alone when `city` is not a favorite.
    pub fn remove(&mut self, city: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c != city);
        if self.cities.len() == before {
            return false;
        }
        self.store.save(&self.cities);
        info!(city, "removed favorite");
        true
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
