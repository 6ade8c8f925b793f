use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::WeatherError, format::parse_date_time};

/// A validated point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Validate latitude and wrap longitude into `[-180, 180)`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !longitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::InvalidCoordinates { latitude, longitude });
        }

        Ok(Self { latitude, longitude: normalize_longitude(longitude) })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat: {:.4}, Lon: {:.4}", self.latitude, self.longitude)
    }
}

/// Map longitudes that wrapped around the antimeridian back into `[-180, 180)`.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// A place the user asked about, optionally with a display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: Option<String>,
    pub coordinates: Coordinates,
}

/// One forward-geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Place {
    /// First-level region and country, skipping blanks: `"Bavaria, Germany"`.
    pub fn region(&self) -> String {
        [self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Short title such as `"Munich, DE"`.
    pub fn label(&self) -> String {
        match self.country_code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => format!("{}, {code}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn coordinates(&self) -> Result<Coordinates, WeatherError> {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn to_location(&self) -> Result<Location, WeatherError> {
        Ok(Location { name: Some(self.label()), coordinates: self.coordinates()? })
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.region())
    }
}

/// Unit strings keyed by variable name, e.g. `temperature_2m -> "°C"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Units(BTreeMap<String, String>);

impl Units {
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Units {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Conditions at the time of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub is_day: Option<u8>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    pub weather_code: Option<i64>,
    pub cloud_cover: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub wind_gusts_10m: Option<f64>,
}

/// Column-oriented hourly series; index `i` across all vectors is one hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub dew_point_2m: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i64>>,
    pub pressure_msl: Vec<Option<f64>>,
    pub surface_pressure: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub wind_gusts_10m: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    pub is_day: Vec<Option<u8>>,
}

/// A single row of [`HourlySeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyPoint<'a> {
    pub time: &'a str,
    pub temperature: Option<f64>,
    pub weather_code: Option<i64>,
    pub precipitation_probability: Option<f64>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn point(&self, idx: usize) -> Option<HourlyPoint<'_>> {
        Some(HourlyPoint {
            time: self.time.get(idx)?,
            temperature: cell(&self.temperature_2m, idx),
            weather_code: cell(&self.weather_code, idx),
            precipitation_probability: cell(&self.precipitation_probability, idx),
        })
    }
}

/// Column-oriented daily series; index `i` across all vectors is one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i64>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub rain_sum: Vec<Option<f64>>,
    pub showers_sum: Vec<Option<f64>>,
    pub snowfall_sum: Vec<Option<f64>>,
    pub precipitation_hours: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
    pub wind_gusts_10m_max: Vec<Option<f64>>,
    pub wind_direction_10m_dominant: Vec<Option<f64>>,
    pub shortwave_radiation_sum: Vec<Option<f64>>,
    pub et0_fao_evapotranspiration: Vec<Option<f64>>,
}

/// A single row of [`DailySeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint<'a> {
    pub date: &'a str,
    pub weather_code: Option<i64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub sunrise: Option<&'a str>,
    pub sunset: Option<&'a str>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn point(&self, idx: usize) -> Option<DailyPoint<'_>> {
        Some(DailyPoint {
            date: self.time.get(idx)?,
            weather_code: cell(&self.weather_code, idx),
            high: cell(&self.temperature_2m_max, idx),
            low: cell(&self.temperature_2m_min, idx),
            sunrise: self.sunrise.get(idx).and_then(|s| s.as_deref()),
            sunset: self.sunset.get(idx).and_then(|s| s.as_deref()),
        })
    }

    pub fn points(&self) -> impl Iterator<Item = DailyPoint<'_>> {
        (0..self.len()).filter_map(|idx| self.point(idx))
    }
}

fn cell<T: Copy>(column: &[Option<T>], idx: usize) -> Option<T> {
    column.get(idx).copied().flatten()
}

/// Decoded `/v1/forecast` payload. Every block is optional because the
/// variable set depends on the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub current: Option<CurrentConditions>,
    pub current_units: Option<Units>,
    pub hourly: Option<HourlySeries>,
    pub hourly_units: Option<Units>,
    pub daily: Option<DailySeries>,
    pub daily_units: Option<Units>,
}

impl Forecast {
    /// Up to `hours` hourly rows starting at the first hour not earlier than
    /// the current observation time. Falls back to the first row when no hour
    /// qualifies or the current time is unknown.
    pub fn hourly_window(&self, hours: usize) -> Vec<HourlyPoint<'_>> {
        let Some(hourly) = &self.hourly else {
            return Vec::new();
        };

        let now = self
            .current
            .as_ref()
            .and_then(|c| c.time.as_deref())
            .and_then(parse_date_time);

        let start = now
            .and_then(|now| {
                hourly
                    .time
                    .iter()
                    .position(|t| parse_date_time(t).is_some_and(|t| t >= now))
            })
            .unwrap_or(0);

        (start..hourly.len()).take(hours).filter_map(|idx| hourly.point(idx)).collect()
    }

    /// Sunrise and sunset of the first forecast day, when both are present.
    pub fn todays_sun(&self) -> Option<(&str, &str)> {
        let today = self.daily.as_ref()?.point(0)?;
        Some((today.sunrise?, today.sunset?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longitude_wraps_into_range() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(540.0), -180.0);
        assert_eq!(normalize_longitude(13.5), 13.5);
    }

    #[test]
    fn coordinates_reject_bad_latitude() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
        let c = Coordinates::new(-90.0, 370.0).expect("valid");
        assert_eq!(c.longitude, 10.0);
    }

    #[test]
    fn coordinates_display_four_decimals() {
        let c = Coordinates::new(52.52, 13.405).expect("valid");
        assert_eq!(c.to_string(), "Lat: 52.5200, Lon: 13.4050");
    }

    fn place(admin1: Option<&str>, country: Option<&str>) -> Place {
        Place {
            name: "Springfield".into(),
            latitude: 39.8,
            longitude: -89.6,
            country: country.map(Into::into),
            country_code: Some("US".into()),
            admin1: admin1.map(Into::into),
            timezone: None,
        }
    }

    #[test]
    fn region_skips_missing_parts() {
        assert_eq!(place(Some("Illinois"), Some("United States")).region(), "Illinois, United States");
        assert_eq!(place(None, Some("United States")).region(), "United States");
        assert_eq!(place(Some(""), None).region(), "");
    }

    #[test]
    fn place_label_and_display() {
        let p = place(Some("Illinois"), Some("United States"));
        assert_eq!(p.label(), "Springfield, US");
        assert_eq!(p.to_string(), "Springfield (Illinois, United States)");
    }

    fn sample() -> Forecast {
        serde_json::from_value(serde_json::json!({
            "current": { "time": "2024-01-15T12:15", "temperature_2m": 5.5, "weather_code": 3 },
            "hourly": {
                "time": ["2024-01-15T11:00", "2024-01-15T12:00", "2024-01-15T13:00", "2024-01-15T14:00"],
                "temperature_2m": [4.0, 5.0, null, 7.0],
                "weather_code": [3, 3, 61, 61],
                "precipitation_probability": [0, 10, 60, 80]
            },
            "daily": {
                "time": ["2024-01-15"],
                "sunrise": ["2024-01-15T07:15"],
                "sunset": ["2024-01-15T16:30"]
            }
        }))
        .expect("fixture parses")
    }

    #[test]
    fn hourly_window_starts_at_first_hour_not_before_now() {
        let forecast = sample();
        let window = forecast.hourly_window(24);
        let times: Vec<_> = window.iter().map(|p| p.time).collect();
        assert_eq!(times, ["2024-01-15T13:00", "2024-01-15T14:00"]);
        assert_eq!(window[0].temperature, None);
        assert_eq!(window[0].weather_code, Some(61));
    }

    #[test]
    fn hourly_window_respects_length() {
        let mut forecast = sample();
        forecast.current = None;
        let window = forecast.hourly_window(2);
        let times: Vec<_> = window.iter().map(|p| p.time).collect();
        assert_eq!(times, ["2024-01-15T11:00", "2024-01-15T12:00"]);
    }

    #[test]
    fn hourly_window_falls_back_to_start_when_all_hours_passed() {
        let mut forecast = sample();
        if let Some(current) = forecast.current.as_mut() {
            current.time = Some("2024-01-16T00:00".into());
        }
        assert_eq!(forecast.hourly_window(1)[0].time, "2024-01-15T11:00");
    }

    #[test]
    fn todays_sun_reads_first_day() {
        assert_eq!(sample().todays_sun(), Some(("2024-01-15T07:15", "2024-01-15T16:30")));
        assert_eq!(Forecast::default().todays_sun(), None);
    }

    #[test]
    fn short_columns_read_as_missing() {
        let daily = DailySeries { time: vec!["2024-01-15".into()], ..DailySeries::default() };
        let point = daily.point(0).expect("row exists");
        assert_eq!(point.high, None);
        assert_eq!(point.sunrise, None);
        assert!(daily.point(1).is_none());
    }
}
