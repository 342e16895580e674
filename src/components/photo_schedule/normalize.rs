//! Normalization of raw sheet cells: dates, pipe-delimited lists, slots and weekdays.

use super::models::{SlotSelector, TimeSlot};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use tracing::warn;

/// Formats tried after the strict ISO and day-first forms
const GENERAL_DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

const GENERAL_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// True for `YYYY-MM-DD` with exactly those digit counts
fn is_strict_iso(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Shape of a day-first `D[/.-]M[/.-][YYYY]` cell
enum DayFirst {
    /// Not day-first at all; general parsing may still succeed
    NoMatch,
    /// Day and month digits followed by something other than a 4-digit year
    BadYear,
    Parts { day: u32, month: u32, year: Option<i32> },
}

fn split_day_month(value: &str) -> DayFirst {
    let parts: Vec<&str> = value.split(['/', '.', '-']).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return DayFirst::NoMatch;
    }

    let is_digits = |s: &str, min: usize, max: usize| {
        s.len() >= min && s.len() <= max && s.bytes().all(|b| b.is_ascii_digit())
    };

    if !is_digits(parts[0], 1, 2) || !is_digits(parts[1], 1, 2) {
        return DayFirst::NoMatch;
    }

    let (Ok(day), Ok(month)) = (parts[0].parse(), parts[1].parse()) else {
        return DayFirst::NoMatch;
    };

    match parts.get(2) {
        None => DayFirst::Parts { day, month, year: None },
        Some(year) if is_digits(year, 4, 4) => match year.parse() {
            Ok(year) => DayFirst::Parts { day, month, year: Some(year) },
            Err(_) => DayFirst::BadYear,
        },
        Some(_) => DayFirst::BadYear,
    }
}

/// Last-resort parsing of anything a spreadsheet might export
fn parse_general_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.date_naive());
    }
    for format in GENERAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    GENERAL_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse a date cell into a calendar date
///
/// Accepts `YYYY-MM-DD`, day-first `D/M`, `D.M.YYYY`, `D-M-YYYY` (the year
/// defaults to `reference_year`) and a handful of general formats. Values
/// that do not name a real calendar day are rejected.
pub fn normalize_date(raw: &str, reference_year: i32) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if is_strict_iso(trimmed) {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
    } else {
        match split_day_month(trimmed) {
            DayFirst::Parts { day, month, year } => {
                NaiveDate::from_ymd_opt(year.unwrap_or(reference_year), month, day)
            }
            DayFirst::BadYear => None,
            DayFirst::NoMatch => parse_general_date(trimmed),
        }
    };

    if parsed.is_none() {
        warn!("Unable to parse date value \"{}\"", raw);
    }
    parsed
}

/// Parse a `|`-delimited list of dates, dropping the ones that fail
pub fn parse_date_list(raw: &str, reference_year: i32) -> Vec<NaiveDate> {
    raw.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| normalize_date(token, reference_year))
        .collect()
}

/// Parse a `|`-delimited list of URLs, dropping empty tokens
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a slot cell; blank means the whole day, unknown tokens are `None`
pub fn normalize_slot(raw: &str) -> Option<SlotSelector> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "" | "all" | "any" | "*" => Some(SlotSelector::All),
        "morning" => Some(SlotSelector::Slot(TimeSlot::Morning)),
        "noon" => Some(SlotSelector::Slot(TimeSlot::Noon)),
        "evening" => Some(SlotSelector::Slot(TimeSlot::Evening)),
        "night" => Some(SlotSelector::Slot(TimeSlot::Night)),
        _ => None,
    }
}

/// Map a full weekday name (any case) to a weekday
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.trim().to_lowercase().as_str() {
        "sunday" => Some(Weekday::Sun),
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(raw: &str, year: i32) -> Option<String> {
        normalize_date(raw, year).map(|date| date.to_string())
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(canonical("2024-04-15", 2020), Some("2024-04-15".to_string()));
        assert_eq!(canonical("2024-3-5", 2024), Some("2024-03-05".to_string()));
        assert_eq!(canonical("5/3", 2024), Some("2024-03-05".to_string()));
        assert_eq!(canonical("5.3.2025", 2024), Some("2025-03-05".to_string()));
        assert_eq!(canonical("15-4-2024", 2000), Some("2024-04-15".to_string()));
        assert_eq!(canonical("April 15, 2024", 2000), Some("2024-04-15".to_string()));
        assert_eq!(canonical("2024-04-15T08:30:00Z", 2000), Some("2024-04-15".to_string()));
    }

    #[test]
    fn test_normalize_date_rejects() {
        assert_eq!(canonical("", 2024), None);
        assert_eq!(canonical("   ", 2024), None);
        assert_eq!(canonical("not-a-date", 2024), None);
        assert_eq!(canonical("31/2", 2024), None);
        assert_eq!(canonical("2024-13-01", 2024), None);
        assert_eq!(canonical("5/3/24", 2024), None);
    }

    #[test]
    fn test_parse_date_list_keeps_order_and_duplicates() {
        let dates = parse_date_list("16/4 | bogus | 2024-04-15 | 16/4", 2024);
        let rendered: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["2024-04-16", "2024-04-15", "2024-04-16"]);
    }

    #[test]
    fn test_parse_url_list() {
        assert_eq!(
            parse_url_list(" a.jpg || b.jpg |  "),
            vec!["a.jpg".to_string(), "b.jpg".to_string()]
        );
        assert!(parse_url_list("").is_empty());
    }

    #[test]
    fn test_normalize_slot_synonyms() {
        assert_eq!(normalize_slot(""), Some(SlotSelector::All));
        assert_eq!(normalize_slot("all"), Some(SlotSelector::All));
        assert_eq!(normalize_slot("ANY"), Some(SlotSelector::All));
        assert_eq!(normalize_slot("*"), Some(SlotSelector::All));
        assert_eq!(normalize_slot(" Noon "), Some(SlotSelector::Slot(TimeSlot::Noon)));
        assert_eq!(normalize_slot("NIGHT"), Some(SlotSelector::Slot(TimeSlot::Night)));
        assert_eq!(normalize_slot("afternoon"), None);
        assert_eq!(normalize_slot("default"), None);
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday(" SUNDAY "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Fri"), None);
        assert_eq!(parse_weekday(""), None);
    }
}
