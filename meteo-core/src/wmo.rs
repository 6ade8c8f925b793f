//! WMO weather interpretation codes as reported by Open-Meteo.
//!
//! See <https://open-meteo.com/en/docs#weathervariables>.

/// Human-facing rendering of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub description: &'static str,
    pub icon: &'static str,
}

impl Condition {
    const fn new(description: &'static str, icon: &'static str) -> Self {
        Self { description, icon }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon, self.description)
    }
}

/// Returned for any code outside the documented set.
pub const UNKNOWN: Condition = Condition::new("Unknown", "❓");

// Sorted by code; `translate` relies on it for binary search.
const TABLE: &[(i64, Condition)] = &[
    (0, Condition::new("Clear sky", "☀️")),
    (1, Condition::new("Mainly clear", "🌤️")),
    (2, Condition::new("Partly cloudy", "⛅")),
    (3, Condition::new("Overcast", "☁️")),
    (45, Condition::new("Fog", "🌫️")),
    (48, Condition::new("Depositing rime fog", "🌫️")),
    (51, Condition::new("Light drizzle", "🌦️")),
    (53, Condition::new("Moderate drizzle", "🌦️")),
    (55, Condition::new("Dense drizzle", "🌦️")),
    (56, Condition::new("Light freezing drizzle", "🥶")),
    (57, Condition::new("Dense freezing drizzle", "🥶")),
    (61, Condition::new("Slight rain", "🌧️")),
    (63, Condition::new("Moderate rain", "🌧️")),
    (65, Condition::new("Heavy rain", "🌧️")),
    (66, Condition::new("Light freezing rain", "🥶🌧️")),
    (67, Condition::new("Heavy freezing rain", "🥶🌧️")),
    (71, Condition::new("Slight snow fall", "🌨️")),
    (73, Condition::new("Moderate snow fall", "🌨️")),
    (75, Condition::new("Heavy snow fall", "🌨️")),
    (77, Condition::new("Snow grains", "🌨️")),
    (80, Condition::new("Slight rain showers", "🌦️")),
    (81, Condition::new("Moderate rain showers", "🌦️")),
    (82, Condition::new("Violent rain showers", "⛈️")),
    (85, Condition::new("Slight snow showers", "🌨️")),
    (86, Condition::new("Heavy snow showers", "🌨️")),
    (95, Condition::new("Thunderstorm", "⛈️")),
    (96, Condition::new("Thunderstorm with slight hail", "⛈️🧊")),
    (99, Condition::new("Thunderstorm with heavy hail", "⛈️🧊")),
];

/// Look up the description and icon for a WMO code.
///
/// Never fails: unmapped codes yield [`UNKNOWN`].
pub fn translate(code: i64) -> Condition {
    TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|idx| TABLE[idx].1)
        .unwrap_or(UNKNOWN)
}

/// Same as [`translate`], treating a missing code as unknown.
pub fn translate_opt(code: Option<i64>) -> Condition {
    code.map_or(UNKNOWN, translate)
}

/// All documented codes in ascending order.
pub fn table() -> impl Iterator<Item = (i64, Condition)> {
    TABLE.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(TABLE.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn documented_codes_translate_exactly() {
        let expected = [
            (0, "Clear sky", "☀️"),
            (1, "Mainly clear", "🌤️"),
            (2, "Partly cloudy", "⛅"),
            (3, "Overcast", "☁️"),
            (45, "Fog", "🌫️"),
            (48, "Depositing rime fog", "🌫️"),
            (51, "Light drizzle", "🌦️"),
            (53, "Moderate drizzle", "🌦️"),
            (55, "Dense drizzle", "🌦️"),
            (56, "Light freezing drizzle", "🥶"),
            (57, "Dense freezing drizzle", "🥶"),
            (61, "Slight rain", "🌧️"),
            (63, "Moderate rain", "🌧️"),
            (65, "Heavy rain", "🌧️"),
            (66, "Light freezing rain", "🥶🌧️"),
            (67, "Heavy freezing rain", "🥶🌧️"),
            (71, "Slight snow fall", "🌨️"),
            (73, "Moderate snow fall", "🌨️"),
            (75, "Heavy snow fall", "🌨️"),
            (77, "Snow grains", "🌨️"),
            (80, "Slight rain showers", "🌦️"),
            (81, "Moderate rain showers", "🌦️"),
            (82, "Violent rain showers", "⛈️"),
            (85, "Slight snow showers", "🌨️"),
            (86, "Heavy snow showers", "🌨️"),
            (95, "Thunderstorm", "⛈️"),
            (96, "Thunderstorm with slight hail", "⛈️🧊"),
            (99, "Thunderstorm with heavy hail", "⛈️🧊"),
        ];

        assert_eq!(table().count(), expected.len());
        for (code, description, icon) in expected {
            let condition = translate(code);
            assert_eq!(condition.description, description, "code {code}");
            assert_eq!(condition.icon, icon, "code {code}");
        }
    }

    #[test]
    fn unmapped_codes_fall_back_to_unknown() {
        for code in [-1, 4, 50, 100, 9999, i64::MIN, i64::MAX] {
            assert_eq!(translate(code), UNKNOWN, "code {code}");
        }
        assert_eq!(UNKNOWN.description, "Unknown");
        assert_eq!(UNKNOWN.icon, "❓");
    }

    #[test]
    fn thunderstorm_uses_an_emoji_icon() {
        assert_eq!(translate(95).icon, "⛈️");
    }

    #[test]
    fn missing_code_is_unknown() {
        assert_eq!(translate_opt(None), UNKNOWN);
        assert_eq!(translate_opt(Some(3)).description, "Overcast");
    }

    #[test]
    fn display_puts_icon_first() {
        assert_eq!(translate(45).to_string(), "🌫️ Fog");
    }
}
