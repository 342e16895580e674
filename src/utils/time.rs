use crate::components::photo_schedule::models::TimeSlot;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;

/// Local hours at which a new time slot starts
const SLOT_START_HOURS: [u32; 4] = [5, 12, 18, 20];

/// Localized long weekday name
pub fn weekday_long(day: Weekday, locale: &str) -> String {
    match day {
        Weekday::Sun => t!("day_long_sunday", locale = locale),
        Weekday::Mon => t!("day_long_monday", locale = locale),
        Weekday::Tue => t!("day_long_tuesday", locale = locale),
        Weekday::Wed => t!("day_long_wednesday", locale = locale),
        Weekday::Thu => t!("day_long_thursday", locale = locale),
        Weekday::Fri => t!("day_long_friday", locale = locale),
        Weekday::Sat => t!("day_long_saturday", locale = locale),
    }
    .to_string()
}

/// Localized long month name, `month` being 1-12
pub fn month_long(month: u32, locale: &str) -> String {
    match month {
        1 => t!("month_long_january", locale = locale),
        2 => t!("month_long_february", locale = locale),
        3 => t!("month_long_march", locale = locale),
        4 => t!("month_long_april", locale = locale),
        5 => t!("month_long_may", locale = locale),
        6 => t!("month_long_june", locale = locale),
        7 => t!("month_long_july", locale = locale),
        8 => t!("month_long_august", locale = locale),
        9 => t!("month_long_september", locale = locale),
        10 => t!("month_long_october", locale = locale),
        11 => t!("month_long_november", locale = locale),
        _ => t!("month_long_december", locale = locale),
    }
    .to_string()
}

/// Long date readout, e.g. "Monday, April 15, 2024"
pub fn format_long_date(date: NaiveDate, locale: &str) -> String {
    t!(
        "long_date",
        locale = locale,
        weekday = weekday_long(date.weekday(), locale),
        day = date.day(),
        month = month_long(date.month(), locale),
        year = date.year()
    )
    .to_string()
}

/// Clock readout in 24-hour HH:MM:SS
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Format a feed `pubDate` as `DD/MM, HH:MM` in the board timezone
///
/// Feeds use RFC 2822 but some publish RFC 3339; anything else is `None`.
pub fn format_pub_date(raw: &str, tz: Tz) -> Option<String> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()?;
    Some(parsed.with_timezone(&tz).format("%d/%m, %H:%M").to_string())
}

/// Next local time at which the time slot changes
pub fn next_slot_boundary(now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    SLOT_START_HOURS
        .iter()
        .filter_map(|hour| today.and_hms_opt(*hour, 0, 0))
        .find(|boundary| *boundary > now)
        .unwrap_or_else(|| {
            let tomorrow = today + Duration::days(1);
            tomorrow.and_time(NaiveTime::from_hms_opt(SLOT_START_HOURS[0], 0, 0).unwrap_or_default())
        })
}

/// Seconds to wait until `next`, never less than one
pub fn calculate_wait_duration(now: NaiveDateTime, next: NaiveDateTime) -> u64 {
    let seconds = next.signed_duration_since(now).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    seconds as u64
}

/// Slot of a wall-clock time
pub fn slot_at(time: NaiveDateTime) -> TimeSlot {
    TimeSlot::from_hour(time.hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_format_long_date() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert_eq!(format_long_date(date, "en"), "Monday, April 15, 2024");
        assert!(format_long_date(date, "he").contains("2024"));
    }

    #[test]
    fn test_format_pub_date_in_timezone() {
        let raw = "Mon, 15 Apr 2024 06:05:00 GMT";
        assert_eq!(format_pub_date(raw, Tz::UTC), Some("15/04, 06:05".to_string()));
        assert_eq!(
            format_pub_date(raw, Tz::Asia__Jerusalem),
            Some("15/04, 09:05".to_string())
        );
        assert_eq!(
            format_pub_date("2024-04-15T23:30:00Z", Tz::Asia__Jerusalem),
            Some("16/04, 02:30".to_string())
        );
        assert_eq!(format_pub_date("yesterday", Tz::UTC), None);
    }

    #[test]
    fn test_next_slot_boundary() {
        assert_eq!(next_slot_boundary(at(2024, 4, 15, 4, 59)), at(2024, 4, 15, 5, 0));
        assert_eq!(next_slot_boundary(at(2024, 4, 15, 5, 0)), at(2024, 4, 15, 12, 0));
        assert_eq!(next_slot_boundary(at(2024, 4, 15, 19, 30)), at(2024, 4, 15, 20, 0));
        assert_eq!(next_slot_boundary(at(2024, 4, 15, 21, 0)), at(2024, 4, 16, 5, 0));
    }

    #[test]
    fn test_calculate_wait_duration() {
        let now = at(2024, 4, 15, 10, 0);
        assert_eq!(calculate_wait_duration(now, at(2024, 4, 15, 12, 0)), 7200);
        assert_eq!(calculate_wait_duration(now, now), 1);
        assert_eq!(calculate_wait_duration(now, at(2024, 4, 15, 9, 0)), 1);
    }

    #[test]
    fn test_slot_at_boundaries() {
        for boundary_hour in SLOT_START_HOURS {
            let boundary = at(2024, 4, 15, boundary_hour, 0);
            let before = boundary - Duration::minutes(1);
            assert_ne!(slot_at(before), slot_at(boundary));
        }
    }
}
