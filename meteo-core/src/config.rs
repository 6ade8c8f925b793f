use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    format::TemporalFormatter,
    model::{Coordinates, Location},
};

pub const DEFAULT_FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const DEFAULT_REVERSE_GEOCODING_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Endpoints and HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,

    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,

    /// Used only to name locations given by coordinates.
    #[serde(default = "default_reverse_geocoding_base_url")]
    pub reverse_geocoding_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_forecast_base_url() -> String {
    DEFAULT_FORECAST_BASE_URL.to_string()
}

fn default_geocoding_base_url() -> String {
    DEFAULT_GEOCODING_BASE_URL.to_string()
}

fn default_reverse_geocoding_base_url() -> String {
    DEFAULT_REVERSE_GEOCODING_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_hour12() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            geocoding_base_url: default_geocoding_base_url(),
            reverse_geocoding_base_url: default_reverse_geocoding_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A location remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SavedLocation {
    pub fn to_location(&self) -> Result<Location> {
        let coordinates = Coordinates::new(self.latitude, self.longitude)
            .with_context(|| format!("Saved location '{}' has invalid coordinates", self.name))?;
        Ok(Location { name: Some(self.name.clone()), coordinates })
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Locale tag such as `en_US` or `de-DE`; the host locale is used when unset.
    #[serde(default)]
    pub locale: Option<String>,

    /// 12-hour clock with AM/PM when true.
    #[serde(default = "default_hour12")]
    pub hour12: bool,

    /// Example TOML:
    /// [default_location]
    /// name = "Berlin, DE"
    /// latitude = 52.52
    /// longitude = 13.41
    #[serde(default)]
    pub default_location: Option<SavedLocation>,

    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: None,
            hour12: default_hour12(),
            default_location: None,
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// The configured default location, with a hint when none is set.
    pub fn default_location(&self) -> Result<Location> {
        let saved = self.default_location.as_ref().ok_or_else(|| {
            anyhow!(
                "No location given and no default location configured.\n\
                 Hint: pass a place name or --lat/--lon, or run `meteo configure` first."
            )
        })?;

        saved.to_location()
    }

    pub fn set_default_location(&mut self, location: &Location) {
        let name = location
            .name
            .clone()
            .unwrap_or_else(|| location.coordinates.to_string());

        self.default_location = Some(SavedLocation {
            name,
            latitude: location.coordinates.latitude,
            longitude: location.coordinates.longitude,
        });
    }

    pub fn formatter(&self) -> TemporalFormatter {
        TemporalFormatter::from_tag(self.locale.as_deref())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
