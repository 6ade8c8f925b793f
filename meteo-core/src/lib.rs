//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - WMO weather code translation and locale-aware date/time formatting
//! - Clients for the Open-Meteo forecast and geocoding APIs
//! - Configuration handling and shared domain models
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod format;
pub mod geocode;
mod http;
pub mod model;
pub mod provider;
pub mod wmo;

pub use config::{ApiConfig, Config, SavedLocation};
pub use error::WeatherError;
pub use format::{DateOptions, TemporalFormatter, TimeOptions};
pub use geocode::Geocoder;
pub use model::{Coordinates, Forecast, Location, Place};
pub use provider::{ForecastRequest, ForecastScope, WeatherProvider};
pub use wmo::Condition;
