//! Weather Dashboard library
//!
//! The weather core (provider lookups, snapshot cache, favorites persistence,
//! unit conversion and formatting) used by the `weatherdash` binary and by the
//! integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod display;
pub mod favorites;
pub mod service;
pub mod units;
pub mod worker;

pub use service::{FetchError, WeatherService};
