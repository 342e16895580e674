use super::models::{SlotTable, TimeSlot, WeeklySchedule};
use chrono::Weekday;
use lazy_static::lazy_static;

/// Shown when no table has anything for the requested day and slot
pub const PLACEHOLDER_PHOTO: &str = "images/default.jpg";

const CAROUSEL_DIR: &str = "images/carousel/";

lazy_static! {
    /// Built-in weekly carousel used until the photo sheet has been read
    pub static ref DEFAULT_WEEKLY: WeeklySchedule = build_default_weekly();
}

fn carousel(files: &[&str]) -> Vec<String> {
    files
        .iter()
        .map(|file| format!("{}{}", CAROUSEL_DIR, file))
        .collect()
}

fn day_table(morning: &[&str], noon: &[&str], evening: &[&str], night: &[&str]) -> SlotTable {
    SlotTable::from_slots([
        (TimeSlot::Morning, carousel(morning)),
        (TimeSlot::Noon, carousel(noon)),
        (TimeSlot::Evening, carousel(evening)),
        (TimeSlot::Night, carousel(night)),
    ])
}

fn build_default_weekly() -> WeeklySchedule {
    let mut weekly = WeeklySchedule::new();

    let workday_noon = ["goodday_01.jpg", "default.jpg"];
    let workday_evening = ["goodevening_01.jpg", "israel_01.jpg"];
    let weekend_evening = ["goodevening_01.jpg", "israel_01.jpg", "weekend_01.jpg"];

    weekly.insert(
        Weekday::Sun,
        day_table(
            &["morning_03.gif", "sunday_01.jpg"],
            &["goodday_01.jpg", "sunday_01.jpg"],
            &["goodevening_01.jpg"],
            &["goodevening_01.jpg"],
        ),
    );

    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed] {
        weekly.insert(
            day,
            day_table(
                &["morning_04.gif", "morning_01.jpg", "morning_02.jpg"],
                &workday_noon,
                &workday_evening,
                &workday_evening,
            ),
        );
    }

    weekly.insert(
        Weekday::Thu,
        day_table(
            &["morning_04.gif", "morning_02.jpg"],
            &workday_noon,
            &workday_evening,
            &workday_evening,
        ),
    );

    weekly.insert(
        Weekday::Fri,
        day_table(
            &["morning_04.gif", "morning_02.jpg"],
            &workday_noon,
            &weekend_evening,
            &weekend_evening,
        ),
    );

    weekly.insert(
        Weekday::Sat,
        day_table(
            &["morning_04.gif", "morning_01.jpg", "weekend_01.jpg"],
            &["goodday_01.jpg", "default.jpg", "weekend_01.jpg"],
            &weekend_evening,
            &weekend_evening,
        ),
    );

    weekly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::photo_schedule::models::SlotKey;

    #[test]
    fn test_every_day_has_every_slot() {
        for day in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            let table = DEFAULT_WEEKLY.day(day).expect("default day missing");
            for slot in TimeSlot::ALL {
                assert!(table.get(slot.into()).is_some(), "{:?} {:?}", day, slot);
            }
        }
    }

    #[test]
    fn test_default_paths_are_prefixed() {
        let friday = DEFAULT_WEEKLY.day(Weekday::Fri).unwrap();
        assert_eq!(
            friday.get(SlotKey::Night).unwrap(),
            &[
                "images/carousel/goodevening_01.jpg".to_string(),
                "images/carousel/israel_01.jpg".to_string(),
                "images/carousel/weekend_01.jpg".to_string(),
            ][..]
        );
    }
}
