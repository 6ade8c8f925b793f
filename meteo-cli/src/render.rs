//! Plain-text cards for forecasts, search results and the code table.

use std::fmt::Write as _;

use anyhow::{Result, bail};
use clap::ValueEnum;
use meteo_core::{
    Forecast, Location, Place, TemporalFormatter, TimeOptions,
    format::{DateOptions, NOT_AVAILABLE, WeekdayStyle},
    model::{CurrentConditions, DailySeries, Units},
    wmo,
};

/// Hours shown in the hourly section.
pub const HOURS_TO_SHOW: usize = 24;

const LABEL_WIDTH: usize = 16;

/// Part of the detailed view to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Section {
    #[default]
    All,
    Current,
    Hourly,
    Daily,
}

impl Section {
    fn includes(self, other: Section) -> bool {
        self == Section::All || self == other
    }
}

/// Accumulates one titled block of output.
struct Card {
    out: String,
}

impl Card {
    fn new(title: &str, note: Option<&str>) -> Self {
        let mut out = String::new();
        match note {
            Some(note) => {
                let _ = writeln!(out, "{title}  ({note})");
            }
            None => {
                let _ = writeln!(out, "{title}");
            }
        }
        let _ = writeln!(out, "{}", "─".repeat(title.chars().count()));
        Self { out }
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{text}");
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn row(&mut self, label: &str, value: impl std::fmt::Display) {
        let _ = writeln!(self.out, "  {label:<LABEL_WIDTH$}{value}");
    }

    fn finish(self) -> String {
        self.out
    }
}

/// `5.5` + `°C` -> `5.5°C`; a missing value is `N/A` without unit.
fn measure(value: Option<f64>, unit: Option<&str>, sep: &str) -> String {
    match value {
        Some(v) => match unit.filter(|u| !u.is_empty()) {
            Some(unit) => format!("{v}{sep}{unit}"),
            None => v.to_string(),
        },
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Half-up rounding, so -2.5 becomes -2 rather than -3.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// One bar per value; gaps for missing values.
fn sparkline(values: &[Option<f64>]) -> Option<String> {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let present = values.iter().flatten().copied();
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    let span = (max - min).max(0.001);
    Some(
        values
            .iter()
            .map(|v| match v {
                Some(v) => {
                    let norm = ((v - min) / span).clamp(0.0, 1.0);
                    BARS[(norm * (BARS.len() - 1) as f64).round() as usize]
                }
                None => ' ',
            })
            .collect(),
    )
}

fn trend_range(values: &[Option<f64>], unit: &str) -> String {
    let present = values.iter().flatten().copied();
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);
    format!("{}{unit} .. {}{unit}", round_half_up(min), round_half_up(max))
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    formatter: TemporalFormatter,
    hour12: bool,
}

impl Renderer {
    pub fn new(formatter: TemporalFormatter, hour12: bool) -> Self {
        Self { formatter, hour12 }
    }

    fn time(&self, input: Option<&str>) -> String {
        self.formatter.format_time(input, &TimeOptions::clock(self.hour12))
    }

    /// The compact card: current conditions plus today's sunrise and sunset.
    pub fn summary(&self, location: &Location, forecast: &Forecast) -> String {
        let Some(current) = &forecast.current else {
            let mut card = Card::new("Weather Information", None);
            card.line("Received data, but weather details are missing.");
            card.line(format_args!("Selected Coordinates: {}", location.coordinates));
            return card.finish();
        };

        let condition = wmo::translate_opt(current.weather_code);
        let mut card = Card::new(location.name.as_deref().unwrap_or("Current Weather"), None);
        card.line(condition);
        card.blank();

        card.row("Temperature", measure(current.temperature_2m, Some("°C"), " "));
        card.row("Feels Like", measure(current.apparent_temperature, Some("°C"), " "));
        card.row("Humidity", measure(current.relative_humidity_2m, Some("%"), " "));
        card.row("Wind Speed", measure(current.wind_speed_10m, Some("km/h"), " "));

        if let Some((sunrise, sunset)) = forecast.todays_sun() {
            card.row("Sunrise", self.time(Some(sunrise)));
            card.row("Sunset", self.time(Some(sunset)));
        }

        card.blank();
        card.line(format_args!("Last updated: {}", self.time(current.time.as_deref())));
        card.line(format_args!("Selected Coordinates: {}", location.coordinates));
        card.line("Run with --details for hourly and daily forecasts.");
        card.finish()
    }

    /// The full view. Needs current, hourly and daily blocks.
    pub fn details(&self, location: &Location, forecast: &Forecast, section: Section) -> Result<String> {
        let (Some(current), Some(_), Some(daily)) = (&forecast.current, &forecast.hourly, &forecast.daily)
        else {
            bail!("Incomplete weather data received.");
        };

        let mut out = match &location.name {
            Some(name) => format!("{name}\n"),
            None => format!(
                "Location: Lat {:.4}, Lon {:.4}\n",
                location.coordinates.latitude, location.coordinates.longitude
            ),
        };

        let empty = Units::default();
        if section.includes(Section::Current) {
            out.push('\n');
            out.push_str(&self.current(current, forecast.current_units.as_ref().unwrap_or(&empty)));
        }
        if section.includes(Section::Hourly) {
            out.push('\n');
            out.push_str(&self.hourly(forecast, forecast.hourly_units.as_ref().unwrap_or(&empty)));
        }
        if section.includes(Section::Daily) {
            out.push('\n');
            out.push_str(&self.daily(daily, forecast.daily_units.as_ref().unwrap_or(&empty)));
        }
        Ok(out)
    }

    fn current(&self, current: &CurrentConditions, units: &Units) -> String {
        let condition = wmo::translate_opt(current.weather_code);
        let as_of = format!("As of {}", self.time(current.time.as_deref()));
        let mut card = Card::new("Current Conditions", Some(&as_of));

        card.line(format_args!(
            "{}  {}  {}",
            condition.icon,
            measure(current.temperature_2m, units.get("temperature_2m"), ""),
            condition.description
        ));
        card.line(format_args!(
            "Feels like {}",
            measure(current.apparent_temperature, units.get("apparent_temperature"), "")
        ));
        card.blank();

        card.row("Humidity", measure(current.relative_humidity_2m, units.get("relative_humidity_2m"), ""));
        card.row("Wind", measure(current.wind_speed_10m, units.get("wind_speed_10m"), " "));
        card.row("Wind Direction", measure(current.wind_direction_10m, Some("°"), ""));
        card.row("Pressure", measure(current.surface_pressure, units.get("surface_pressure"), " "));
        card.row("Precipitation", measure(current.precipitation, units.get("precipitation"), " "));
        card.row("Cloud Cover", measure(current.cloud_cover, units.get("cloud_cover"), " "));

        // Only shown when the payload carries them.
        let optional = [
            ("Rain", current.rain, "rain"),
            ("Showers", current.showers, "showers"),
            ("Snowfall", current.snowfall, "snowfall"),
            ("Wind Gusts", current.wind_gusts_10m, "wind_gusts_10m"),
        ];
        for (label, value, key) in optional {
            if value.is_some() {
                card.row(label, measure(value, units.get(key), " "));
            }
        }

        card.finish()
    }

    fn hourly(&self, forecast: &Forecast, units: &Units) -> String {
        let note = format!("Next {HOURS_TO_SHOW} Hours");
        let mut card = Card::new("Hourly Forecast", Some(&note));
        let unit = units.get("temperature_2m").unwrap_or("°");
        let hour_options = TimeOptions::hour_only(self.hour12);

        let window = forecast.hourly_window(HOURS_TO_SHOW);
        for point in &window {
            let hour = self.formatter.format_time(Some(point.time), &hour_options);
            let icon = wmo::translate_opt(point.weather_code).icon;
            let temp = point
                .temperature
                .map_or_else(|| "-".to_string(), |t| format!("{}{unit}", round_half_up(t)));
            let precip = point
                .precipitation_probability
                .map_or_else(|| "-".to_string(), |p| format!("{p}%"));

            card.line(format_args!("  {hour:<8}{icon}  {temp:<8}💧 {precip}"));
        }

        let temps: Vec<_> = window.iter().map(|p| p.temperature).collect();
        if let Some(line) = sparkline(&temps) {
            card.blank();
            card.row("Temperature", format_args!("{line}  ({})", trend_range(&temps, unit)));
        }

        card.finish()
    }

    fn daily(&self, daily: &DailySeries, units: &Units) -> String {
        let mut card = Card::new(&format!("{}-Day Forecast", daily.len()), None);
        let high_unit = units.get("temperature_2m_max").unwrap_or("°");
        let low_unit = units.get("temperature_2m_min").unwrap_or("°");

        for (idx, day) in daily.points().enumerate() {
            let name = if idx == 0 {
                "Today".to_string()
            } else {
                self.formatter.format_date(Some(day.date), &DateOptions::weekday(WeekdayStyle::Long))
            };
            let short = self.formatter.format_date(Some(day.date), &DateOptions::month_day());
            let condition = wmo::translate_opt(day.weather_code);
            let high = day.high.map_or_else(|| "-".to_string(), |t| format!("{t}{high_unit}"));
            let low = day.low.map_or_else(|| "-".to_string(), |t| format!("{t}{low_unit}"));

            card.line(format_args!(
                "  {name:<11}{short:<8}{}  {high} / {low}  {}",
                condition.icon, condition.description
            ));
        }

        let highs: Vec<_> = daily.points().map(|d| d.high).collect();
        let lows: Vec<_> = daily.points().map(|d| d.low).collect();
        if let (Some(high_line), Some(low_line)) = (sparkline(&highs), sparkline(&lows)) {
            card.blank();
            card.row("High", format_args!("{high_line}  ({})", trend_range(&highs, high_unit)));
            card.row("Low", format_args!("{low_line}  ({})", trend_range(&lows, low_unit)));
        }

        card.finish()
    }
}

/// One line per geocoding match.
pub fn search_results(places: &[Place]) -> String {
    if places.is_empty() {
        return "No cities found.\n".to_string();
    }

    places
        .iter()
        .map(|p| format!("{p}  {:.4}, {:.4}\n", p.latitude, p.longitude))
        .collect()
}

/// Every documented WMO code with its icon and description.
pub fn code_table() -> String {
    wmo::table()
        .map(|(code, condition)| format!("{code:>4}  {}  {}\n", condition.icon, condition.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteo_core::{Coordinates, format::Locale};

    fn renderer() -> Renderer {
        Renderer::new(TemporalFormatter::new(Locale::en_US), true)
    }

    fn location(name: Option<&str>) -> Location {
        Location {
            name: name.map(Into::into),
            coordinates: Coordinates::new(52.52, 13.405).expect("valid"),
        }
    }

    fn forecast() -> Forecast {
        serde_json::from_value(serde_json::json!({
            "current_units": {
                "temperature_2m": "°C", "apparent_temperature": "°C", "relative_humidity_2m": "%",
                "wind_speed_10m": "km/h", "surface_pressure": "hPa", "precipitation": "mm",
                "cloud_cover": "%", "rain": "mm"
            },
            "current": {
                "time": "2024-01-15T12:00",
                "temperature_2m": 5.5,
                "apparent_temperature": 2.0,
                "relative_humidity_2m": 75,
                "weather_code": 3,
                "wind_speed_10m": 12.5,
                "wind_direction_10m": 225,
                "surface_pressure": 1013.25,
                "precipitation": 0.0,
                "cloud_cover": 80,
                "rain": 0.0
            },
            "hourly_units": { "temperature_2m": "°C" },
            "hourly": {
                "time": ["2024-01-15T11:00", "2024-01-15T12:00", "2024-01-15T13:00"],
                "temperature_2m": [4.4, -2.5, null],
                "weather_code": [3, 61, 95],
                "precipitation_probability": [0, 40, null]
            },
            "daily_units": { "temperature_2m_max": "°C", "temperature_2m_min": "°C" },
            "daily": {
                "time": ["2024-01-15", "2024-01-16"],
                "weather_code": [3, 61],
                "temperature_2m_max": [8.0, null],
                "temperature_2m_min": [2.0, 1.5],
                "sunrise": ["2024-01-15T07:15", "2024-01-16T07:14"],
                "sunset": ["2024-01-15T16:30", "2024-01-16T16:32"]
            }
        }))
        .expect("fixture parses")
    }

    #[test]
    fn summary_shows_current_conditions_and_sun() {
        let out = renderer().summary(&location(Some("Berlin, DE")), &forecast());

        assert!(out.starts_with("Berlin, DE\n──────────\n"));
        assert!(out.contains("☁️ Overcast"));
        assert!(out.contains("Temperature     5.5 °C"));
        assert!(out.contains("Humidity        75 %"));
        assert!(out.contains("Sunrise         7:15 AM"));
        assert!(out.contains("Sunset          4:30 PM"));
        assert!(out.contains("Last updated: 12:00 PM"));
        assert!(out.contains("Selected Coordinates: Lat: 52.5200, Lon: 13.4050"));
    }

    #[test]
    fn summary_without_name_uses_generic_title() {
        let out = renderer().summary(&location(None), &forecast());
        assert!(out.starts_with("Current Weather\n"));
    }

    #[test]
    fn summary_marks_missing_values() {
        let mut data = forecast();
        data.daily = None;
        if let Some(current) = data.current.as_mut() {
            current.temperature_2m = None;
            current.time = None;
        }

        let out = renderer().summary(&location(None), &data);
        assert!(out.contains("Temperature     N/A"));
        assert!(out.contains("Last updated: N/A"));
        assert!(!out.contains("Sunrise"));
    }

    #[test]
    fn summary_without_current_block_explains() {
        let out = renderer().summary(&location(None), &Forecast::default());
        assert!(out.contains("Received data, but weather details are missing."));
    }

    #[test]
    fn details_require_all_blocks() {
        let mut data = forecast();
        data.hourly = None;
        let err = renderer().details(&location(None), &data, Section::All).unwrap_err();
        assert_eq!(err.to_string(), "Incomplete weather data received.");
    }

    #[test]
    fn details_current_section() {
        let out = renderer().details(&location(None), &forecast(), Section::Current).expect("renders");

        assert!(out.starts_with("Location: Lat 52.5200, Lon 13.4050\n"));
        assert!(out.contains("Current Conditions  (As of 12:00 PM)"));
        assert!(out.contains("☁️  5.5°C  Overcast"));
        assert!(out.contains("Feels like 2°C"));
        assert!(out.contains("Wind Direction  225°"));
        assert!(out.contains("Pressure        1013.25 hPa"));
        assert!(out.contains("Rain            0 mm"));
        assert!(!out.contains("Snowfall"));
        assert!(!out.contains("Hourly Forecast"));
    }

    #[test]
    fn details_hourly_section_starts_at_current_hour() {
        let out = renderer().details(&location(None), &forecast(), Section::Hourly).expect("renders");

        assert!(out.contains("Hourly Forecast  (Next 24 Hours)"));
        assert!(!out.contains("11 AM"));
        assert!(out.contains("12 PM"));
        assert!(out.contains("-2°C"));
        assert!(out.contains("💧 40%"));
        assert!(out.contains("💧 -"));
        assert!(out.contains("⛈️"));
    }

    #[test]
    fn details_daily_section() {
        let out = renderer().details(&location(None), &forecast(), Section::Daily).expect("renders");

        assert!(out.contains("2-Day Forecast"));
        assert!(out.contains("Today"));
        assert!(out.contains("Jan 15"));
        assert!(out.contains("Tuesday"));
        assert!(out.contains("8°C / 2°C  Overcast"));
        assert!(out.contains("- / 1.5°C  Slight rain"));
    }

    #[test]
    fn details_all_sections_in_order() {
        let out = renderer().details(&location(Some("Berlin, DE")), &forecast(), Section::All).expect("renders");

        let current = out.find("Current Conditions").expect("current");
        let hourly = out.find("Hourly Forecast").expect("hourly");
        let daily = out.find("Day Forecast").expect("daily");
        assert!(current < hourly && hourly < daily);
    }

    #[test]
    fn twenty_four_hour_clock() {
        let renderer = Renderer::new(TemporalFormatter::new(Locale::en_US), false);
        let out = renderer.summary(&location(None), &forecast());
        assert!(out.contains("Sunset          16:30"));
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(4.4), 4);
    }

    #[test]
    fn sparkline_spans_min_to_max() {
        assert_eq!(sparkline(&[Some(0.0), None, Some(10.0)]).as_deref(), Some("▁ █"));
        assert_eq!(sparkline(&[None, None]), None);
        assert_eq!(sparkline(&[Some(3.0), Some(3.0)]).as_deref(), Some("▁▁"));
    }

    #[test]
    fn search_results_list_regions() {
        let places = vec![Place {
            name: "Paris".into(),
            latitude: 48.85341,
            longitude: 2.3488,
            country: Some("France".into()),
            country_code: Some("FR".into()),
            admin1: Some("Île-de-France".into()),
            timezone: None,
        }];

        assert_eq!(search_results(&places), "Paris (Île-de-France, France)  48.8534, 2.3488\n");
        assert_eq!(search_results(&[]), "No cities found.\n");
    }

    #[test]
    fn code_table_lists_every_code() {
        let table = code_table();
        assert_eq!(table.lines().count(), wmo::table().count());
        assert!(table.contains("  95  ⛈️  Thunderstorm\n"));
    }
}
