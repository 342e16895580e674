use crate::error::{override_error, Error};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// One of the four fixed parts of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeSlot {
    /// All concrete slots in display order
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::Noon,
        TimeSlot::Evening,
        TimeSlot::Night,
    ];

    /// Derive the slot from a local hour (0-23)
    ///
    /// night 20:00-04:59, morning 05:00-11:59, noon 12:00-17:59, evening 18:00-19:59
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeSlot::Morning,
            12..=17 => TimeSlot::Noon,
            18..=19 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }

    /// Hour the simulated clock shows when this slot is forced
    pub fn representative_hour(&self) -> u32 {
        match self {
            TimeSlot::Morning => 9,
            TimeSlot::Noon => 13,
            TimeSlot::Evening => 18,
            TimeSlot::Night => 22,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Noon => "noon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "noon" => Ok(TimeSlot::Noon),
            "evening" => Ok(TimeSlot::Evening),
            "night" => Ok(TimeSlot::Night),
            other => Err(override_error(&format!("Unknown time slot: {}", other))),
        }
    }
}

/// Normalized slot column of a schedule row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSelector {
    Slot(TimeSlot),
    All,
}

/// Key of a per-slot photo table, including the wildcard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKey {
    Morning,
    Noon,
    Evening,
    Night,
    All,
    Any,
    Default,
}

impl From<TimeSlot> for SlotKey {
    fn from(slot: TimeSlot) -> Self {
        match slot {
            TimeSlot::Morning => SlotKey::Morning,
            TimeSlot::Noon => SlotKey::Noon,
            TimeSlot::Evening => SlotKey::Evening,
            TimeSlot::Night => SlotKey::Night,
        }
    }
}

/// Keys written alongside the four slots when a row applies to the whole day
pub const WILDCARD_KEYS: [SlotKey; 3] = [SlotKey::All, SlotKey::Any, SlotKey::Default];

/// Ordered photo URLs per slot key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotTable {
    entries: BTreeMap<SlotKey, Vec<String>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from concrete slot entries
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = (TimeSlot, Vec<S>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (slot, urls) in slots {
            let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
            table.apply(SlotSelector::Slot(slot), &urls);
        }
        table
    }

    /// Write a URL list to the slot(s) a selector implies, replacing what was there
    pub fn apply(&mut self, selector: SlotSelector, urls: &[String]) {
        if urls.is_empty() {
            return;
        }

        match selector {
            SlotSelector::Slot(slot) => {
                self.entries.insert(slot.into(), urls.to_vec());
            }
            SlotSelector::All => {
                for slot in TimeSlot::ALL {
                    self.entries.insert(slot.into(), urls.to_vec());
                }
                for key in WILDCARD_KEYS {
                    self.entries.insert(key, urls.to_vec());
                }
            }
        }
    }

    /// Photos stored under a key; missing and empty entries both read as `None`
    pub fn get(&self, key: SlotKey) -> Option<&[String]> {
        self.entries
            .get(&key)
            .map(Vec::as_slice)
            .filter(|urls| !urls.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every URL in the table, in key order
    pub fn urls(&self) -> impl Iterator<Item = &String> {
        self.entries.values().flatten()
    }
}

/// Full English name of a weekday, as used by the sheets
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Per-weekday photo tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: HashMap<Weekday, SlotTable>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Weekday) -> Option<&SlotTable> {
        self.days.get(&day)
    }

    /// Table for a weekday, created empty on first use
    pub fn day_mut(&mut self, day: Weekday) -> &mut SlotTable {
        self.days.entry(day).or_default()
    }

    pub fn insert(&mut self, day: Weekday, table: SlotTable) {
        self.days.insert(day, table);
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(SlotTable::is_empty)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&Weekday, &SlotTable)> {
        self.days.iter()
    }

    /// Tables keyed by full weekday name, for JSON output
    pub fn to_named_map(&self) -> BTreeMap<&'static str, &SlotTable> {
        self.days
            .iter()
            .map(|(day, table)| (weekday_name(*day), table))
            .collect()
    }
}

/// Photos and display name of one holiday date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub slots: SlotTable,
    pub name: Option<String>,
}

/// Sparse per-date override of the weekly schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidaySchedule {
    dates: BTreeMap<NaiveDate, HolidayEntry>,
}

impl HolidaySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&HolidayEntry> {
        self.dates.get(&date)
    }

    /// Apply a URL list to a date, creating the entry on first use
    ///
    /// An empty list never creates an entry.
    pub fn apply(&mut self, date: NaiveDate, selector: SlotSelector, urls: &[String]) {
        if urls.is_empty() {
            return;
        }
        self.dates.entry(date).or_default().slots.apply(selector, urls);
    }

    /// Attach a display name to an existing date, replacing any earlier name
    pub fn set_name(&mut self, date: NaiveDate, name: &str) {
        if let Some(entry) = self.dates.get_mut(&date) {
            entry.name = Some(name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = (&NaiveDate, &HolidayEntry)> {
        self.dates.iter()
    }
}

/// Where the contents of a snapshot came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Built-in defaults, before any sheet was read or after it was unusable
    Defaults,
    /// Parsed from the photo sheet
    Sheet { fetched_at: DateTime<Utc> },
}

/// Immutable schedule state published by the store
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub generation: u64,
    pub source: SnapshotSource,
    pub weekly: WeeklySchedule,
    pub holidays: HolidaySchedule,
}

impl ScheduleSnapshot {
    /// Snapshot holding only the given weekly table
    pub fn from_defaults(weekly: WeeklySchedule) -> Self {
        Self {
            generation: 0,
            source: SnapshotSource::Defaults,
            weekly,
            holidays: HolidaySchedule::new(),
        }
    }
}
