//! Locale-aware rendering of the date and time strings found in API payloads.
//!
//! Both entry points are total: an absent value renders as [`NOT_AVAILABLE`]
//! and anything that does not parse renders as [`INVALID`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

pub use chrono::Locale;

pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID: &str = "Invalid";

const FALLBACK_LOCALE: Locale = Locale::en_US;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourStyle {
    #[default]
    Numeric,
    TwoDigit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinuteStyle {
    #[default]
    TwoDigit,
    Hidden,
}

/// Presentation of a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOptions {
    pub hour: HourStyle,
    pub minute: MinuteStyle,
    pub hour12: bool,
}

impl Default for TimeOptions {
    fn default() -> Self {
        Self { hour: HourStyle::Numeric, minute: MinuteStyle::TwoDigit, hour12: true }
    }
}

impl TimeOptions {
    /// Hour and minute, e.g. `5:07 AM` or `5:07`.
    pub fn clock(hour12: bool) -> Self {
        Self { hour12, ..Self::default() }
    }

    /// Hour only, e.g. `5 AM` or `5`.
    pub fn hour_only(hour12: bool) -> Self {
        Self { hour: HourStyle::Numeric, minute: MinuteStyle::Hidden, hour12 }
    }

    /// Hour and minute only; the day-period marker is added by the formatter.
    fn pattern(&self) -> String {
        let mut pattern = String::from(match (self.hour12, self.hour) {
            (true, HourStyle::Numeric) => "%-I",
            (true, HourStyle::TwoDigit) => "%I",
            (false, HourStyle::Numeric) => "%-H",
            (false, HourStyle::TwoDigit) => "%H",
        });
        if self.minute == MinuteStyle::TwoDigit {
            pattern.push_str(":%M");
        }
        pattern
    }
}

/// Where a locale puts the month relative to the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrder {
    /// `Mar 1`, `3/1/2024`
    MonthDay,
    /// `1 Mar`, `1/3/2024`
    DayMonth,
    /// `1. März`, `1.3.2024`
    DayDotMonth,
}

impl DateOrder {
    fn of(locale: Locale) -> Self {
        match locale {
            Locale::de_DE | Locale::de_AT | Locale::de_CH | Locale::da_DK | Locale::fi_FI => Self::DayDotMonth,
            Locale::en_GB
            | Locale::en_AU
            | Locale::en_IE
            | Locale::en_NZ
            | Locale::fr_FR
            | Locale::fr_BE
            | Locale::fr_CH
            | Locale::es_ES
            | Locale::it_IT
            | Locale::pt_PT
            | Locale::pt_BR
            | Locale::nl_NL
            | Locale::ru_RU
            | Locale::pl_PL
            | Locale::sv_SE => Self::DayMonth,
            _ => Self::MonthDay,
        }
    }
}

/// Locales that print the day-period marker before the time, with the separator to use.
fn marker_prefix(locale: Locale) -> Option<&'static str> {
    match locale {
        Locale::ja_JP | Locale::zh_CN | Locale::zh_TW => Some(""),
        Locale::ko_KR => Some(" "),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayStyle {
    Long,
    Short,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStyle {
    Long,
    Short,
    Numeric,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStyle {
    Numeric,
    TwoDigit,
    Hidden,
}

/// Presentation of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOptions {
    pub weekday: WeekdayStyle,
    pub month: MonthStyle,
    pub day: DayStyle,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self { weekday: WeekdayStyle::Short, month: MonthStyle::Short, day: DayStyle::Numeric }
    }
}

impl DateOptions {
    /// Weekday name only, e.g. `Friday`.
    pub fn weekday(style: WeekdayStyle) -> Self {
        Self { weekday: style, month: MonthStyle::Hidden, day: DayStyle::Hidden }
    }

    /// Month and day without weekday, e.g. `Mar 1`.
    pub fn month_day() -> Self {
        Self { weekday: WeekdayStyle::Hidden, month: MonthStyle::Short, day: DayStyle::Numeric }
    }

    fn pattern(&self, order: DateOrder) -> String {
        let day = match self.day {
            DayStyle::Numeric => Some("%-d"),
            DayStyle::TwoDigit => Some("%d"),
            DayStyle::Hidden => None,
        };

        let month_day = match (self.month, day) {
            (MonthStyle::Long | MonthStyle::Short, Some(d)) => {
                let month = if self.month == MonthStyle::Long { "%B" } else { "%b" };
                match order {
                    DateOrder::MonthDay => format!("{month} {d}"),
                    DateOrder::DayMonth => format!("{d} {month}"),
                    DateOrder::DayDotMonth => format!("{d}. {month}"),
                }
            }
            (MonthStyle::Numeric, Some(d)) => match order {
                DateOrder::MonthDay => format!("%-m/{d}"),
                DateOrder::DayMonth => format!("{d}/%-m"),
                DateOrder::DayDotMonth => format!("{d}.%-m."),
            },
            (MonthStyle::Long, None) => "%B".to_string(),
            (MonthStyle::Short, None) => "%b".to_string(),
            (MonthStyle::Numeric, None) => "%-m".to_string(),
            (MonthStyle::Hidden, Some(d)) => d.to_string(),
            (MonthStyle::Hidden, None) => String::new(),
        };

        let weekday = match self.weekday {
            WeekdayStyle::Long => Some("%A"),
            WeekdayStyle::Short => Some("%a"),
            WeekdayStyle::Hidden => None,
        };

        match (weekday, month_day.is_empty()) {
            (Some(w), false) => format!("{w}, {month_day}"),
            (Some(w), true) => w.to_string(),
            (None, false) => month_day,
            // Nothing requested: numeric date.
            (None, true) => match order {
                DateOrder::MonthDay => "%-m/%-d/%Y",
                DateOrder::DayMonth => "%-d/%-m/%Y",
                DateOrder::DayDotMonth => "%-d.%-m.%Y",
            }
            .to_string(),
        }
    }
}

/// Formats API timestamps for display in a fixed locale.
#[derive(Debug, Clone, Copy)]
pub struct TemporalFormatter {
    locale: Locale,
}

impl Default for TemporalFormatter {
    fn default() -> Self {
        Self::new(FALLBACK_LOCALE)
    }
}

impl TemporalFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Resolve the locale from an explicit tag, then the host locale, then `en_US`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let locale = tag
            .and_then(parse_locale)
            .or_else(|| sys_locale::get_locale().as_deref().and_then(parse_locale))
            .unwrap_or(FALLBACK_LOCALE);
        Self::new(locale)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Render a date-time as a time of day.
    pub fn format_time(&self, input: Option<&str>, options: &TimeOptions) -> String {
        let Some(input) = input.filter(|s| !s.is_empty()) else {
            return NOT_AVAILABLE.to_string();
        };

        match parse_date_time(input) {
            Some(dt) => self.render_time(dt, options),
            None => {
                tracing::debug!(input, "could not parse time");
                INVALID.to_string()
            }
        }
    }

    /// Render a calendar day. Date-only input is taken as midnight of that day,
    /// so the day never shifts with the host's UTC offset.
    pub fn format_date(&self, input: Option<&str>, options: &DateOptions) -> String {
        let Some(input) = input.filter(|s| !s.is_empty()) else {
            return NOT_AVAILABLE.to_string();
        };

        match parse_date(input) {
            Some(date) => {
                let pattern = options.pattern(DateOrder::of(self.locale));
                self.render(date.and_time(NaiveTime::MIN), &pattern)
            }
            None => {
                tracing::debug!(input, "could not parse date");
                INVALID.to_string()
            }
        }
    }

    fn render_time(&self, wall_clock: NaiveDateTime, options: &TimeOptions) -> String {
        let clock = self.render(wall_clock, &options.pattern());
        if !options.hour12 {
            return clock;
        }

        let marker = self.day_period(wall_clock);
        match marker_prefix(self.locale) {
            Some(sep) => format!("{marker}{sep}{clock}"),
            None => format!("{clock} {marker}"),
        }
    }

    // Many locale tables leave AM/PM empty; a 12-hour clock still needs one.
    fn day_period(&self, wall_clock: NaiveDateTime) -> String {
        let marker = self.render(wall_clock, "%p");
        if !marker.trim().is_empty() {
            return marker.trim().to_string();
        }
        if wall_clock.hour() < 12 { "AM" } else { "PM" }.to_string()
    }

    // Wall-clock values are formatted through UTC so no offset is applied.
    fn render(&self, wall_clock: NaiveDateTime, pattern: &str) -> String {
        Utc.from_utc_datetime(&wall_clock).format_localized(pattern, self.locale).to_string()
    }
}

/// Normalize a tag such as `de-DE`, `de_DE.UTF-8` or `sr_RS@latin` and look it up.
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let base = tag.split(['.', '@']).next().unwrap_or(tag).replace('-', "_");
    Locale::try_from(base.as_str()).ok()
}

/// Parse a local wall-clock date-time.
///
/// Open-Meteo (`timezone=auto`) sends offset-less values already in the
/// location's time zone; those are kept as-is. Values carrying an offset are
/// moved into the host's time zone.
pub fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_time(input).map(|dt| dt.date()))
}
