use super::defaults::{DEFAULT_WEEKLY, PLACEHOLDER_PHOTO};
use super::models::{ScheduleSnapshot, SlotKey, SlotTable, TimeSlot, WeeklySchedule};
use chrono::{NaiveDate, Weekday};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

lazy_static! {
    static ref PLACEHOLDER_PHOTOS: Vec<String> = vec![PLACEHOLDER_PHOTO.to_string()];
}

/// Wildcard keys honoured on holiday entries
const HOLIDAY_WILDCARDS: [SlotKey; 3] = [SlotKey::All, SlotKey::Any, SlotKey::Default];

/// Wildcard keys honoured on weekday tables
const WEEKLY_WILDCARDS: [SlotKey; 2] = [SlotKey::All, SlotKey::Any];

/// Weekdays in the order the board's week runs
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// One step of the photo fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupTier {
    HolidaySlot,
    HolidayWildcard,
    WeeklySlot,
    WeeklyWildcard,
    DefaultSlot,
    DefaultWildcard,
    Placeholder,
}

impl LookupTier {
    /// Tiers in the order they are consulted
    pub const ORDER: [LookupTier; 7] = [
        LookupTier::HolidaySlot,
        LookupTier::HolidayWildcard,
        LookupTier::WeeklySlot,
        LookupTier::WeeklyWildcard,
        LookupTier::DefaultSlot,
        LookupTier::DefaultWildcard,
        LookupTier::Placeholder,
    ];

    pub fn is_holiday(&self) -> bool {
        matches!(self, LookupTier::HolidaySlot | LookupTier::HolidayWildcard)
    }
}

/// Result of consulting a single tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a [String]),
    NotFound,
}

impl<'a> Lookup<'a> {
    fn from_table(table: Option<&'a SlotTable>, keys: &[SlotKey]) -> Self {
        table
            .and_then(|table| keys.iter().find_map(|key| table.get(*key)))
            .map_or(Lookup::NotFound, Lookup::Found)
    }
}

/// Photos chosen for a moment, and how they were found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub tier: LookupTier,
    pub photos: Vec<String>,
    pub holiday_name: Option<String>,
}

/// Walks the fallback chain over one snapshot
pub struct Resolver<'a> {
    snapshot: &'a ScheduleSnapshot,
    defaults: &'a WeeklySchedule,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a ScheduleSnapshot, defaults: &'a WeeklySchedule) -> Self {
        Self { snapshot, defaults }
    }

    /// Consult a single tier
    pub fn lookup(&self, tier: LookupTier, day: Weekday, date: NaiveDate, slot: TimeSlot) -> Lookup<'a> {
        let holiday = self.snapshot.holidays.get(date).map(|entry| &entry.slots);
        match tier {
            LookupTier::HolidaySlot => Lookup::from_table(holiday, &[slot.into()]),
            LookupTier::HolidayWildcard => Lookup::from_table(holiday, &HOLIDAY_WILDCARDS),
            LookupTier::WeeklySlot => Lookup::from_table(self.snapshot.weekly.day(day), &[slot.into()]),
            LookupTier::WeeklyWildcard => Lookup::from_table(self.snapshot.weekly.day(day), &WEEKLY_WILDCARDS),
            LookupTier::DefaultSlot => Lookup::from_table(self.defaults.day(day), &[slot.into()]),
            LookupTier::DefaultWildcard => Lookup::from_table(self.defaults.day(day), &WEEKLY_WILDCARDS),
            LookupTier::Placeholder => Lookup::Found(PLACEHOLDER_PHOTOS.as_slice()),
        }
    }

    /// First non-empty tier wins; the placeholder always matches
    pub fn resolve(&self, day: Weekday, date: NaiveDate, slot: TimeSlot) -> Resolution {
        let (tier, photos) = LookupTier::ORDER
            .iter()
            .find_map(|tier| match self.lookup(*tier, day, date, slot) {
                Lookup::Found(photos) => Some((*tier, photos)),
                Lookup::NotFound => None,
            })
            .unwrap_or((LookupTier::Placeholder, PLACEHOLDER_PHOTOS.as_slice()));

        let holiday_name = if tier.is_holiday() {
            self.snapshot
                .holidays
                .get(date)
                .and_then(|entry| entry.name.clone())
        } else {
            None
        };

        Resolution {
            date,
            slot,
            tier,
            photos: photos.to_vec(),
            holiday_name,
        }
    }
}

/// Photos to show for a weekday, date and slot against the built-in defaults
pub fn resolve_photos(
    snapshot: &ScheduleSnapshot,
    day: Weekday,
    date: NaiveDate,
    slot: TimeSlot,
) -> Vec<String> {
    Resolver::new(snapshot, &DEFAULT_WEEKLY)
        .resolve(day, date, slot)
        .photos
}

/// Distinct URLs of the active weekly table, or of the defaults when it is empty
pub fn preload_list(snapshot: &ScheduleSnapshot) -> Vec<String> {
    let weekly = if snapshot.weekly.is_empty() {
        &*DEFAULT_WEEKLY
    } else {
        &snapshot.weekly
    };

    let mut seen = HashSet::new();
    WEEK.iter()
        .filter_map(|day| weekly.day(*day))
        .flat_map(SlotTable::urls)
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
