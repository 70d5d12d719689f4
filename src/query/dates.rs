use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::sync::OnceLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether `s` reads as a calendar date or a date-time.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Calendar date of a date or date-time string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // Year and month alone means the first of the month.
    NaiveDate::parse_from_str(&format!("{s}-01"), DATE_FORMAT).ok()
}

/// Keeps `value` if it is a parseable date string, otherwise falls back to
/// `today`.
pub fn normalize_date_at(value: Option<&Value>, today: NaiveDate) -> String {
    match value.and_then(Value::as_str) {
        Some(s) if is_valid_date(s) => s.to_string(),
        _ => format_date(today),
    }
}

/// True when the value ends in an `HH:MM:SS` time of day.
pub fn has_time(value: &str) -> bool {
    static TIME_SUFFIX: OnceLock<regex::Regex> = OnceLock::new();
    let re = TIME_SUFFIX
        .get_or_init(|| regex::Regex::new(r"T\d{2}:\d{2}:\d{2}$").expect("Invalid regex"));
    re.is_match(value)
}

pub fn date_part(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

pub fn with_time(value: &str, hour: u32, minute: u32) -> String {
    format!("{}T{:02}:{:02}:00", date_part(value), hour.min(23), minute.min(59))
}

pub fn without_time(value: &str) -> String {
    date_part(value).to_string()
}
