//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Lowercase abbreviated month names, January first
const MONTHS_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const MONTHS_EN: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a CMS timestamp such as `2021-06-16T23:31:35+0000`
///
/// RFC 3339 (`+00:00`, `Z`) is accepted as well.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

/// Format a publication date as `dd mmm yyyy` in the site's language and timezone
///
/// A missing date formats to an empty string; templates drop the field then.
///
/// # Examples
/// ```ignore
/// format_date(Some(&date), chrono_tz::UTC, "pt-BR") // -> "16 jun 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: Option<&DateTime<Utc>>, tz: Tz, language: &str) -> String {
    let Some(date) = date else {
        return String::new();
    };
    let local = date.with_timezone(&tz);
    let month = month_names(language)[local.month0() as usize];
    format!("{:02} {} {}", local.day(), month, local.year())
}

fn month_names(language: &str) -> &'static [&'static str; 12] {
    if language.to_ascii_lowercase().starts_with("en") {
        &MONTHS_EN
    } else {
        &MONTHS_PT
    }
}
