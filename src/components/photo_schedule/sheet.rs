//! Interpretation of the published photo schedule sheet.

use super::models::{HolidaySchedule, SlotSelector, WeeklySchedule};
use super::normalize::{normalize_slot, parse_date_list, parse_url_list, parse_weekday};
use crate::error::{sheet_error, BoardResult, Error};
use chrono::{NaiveDate, Weekday};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Header names that mark the first record as a header row
const KNOWN_HEADERS: [&str; 8] = [
    "day_of_week",
    "time_slot",
    "photo_urls",
    "type",
    "date",
    "holiday_name",
    "name",
    "title",
];

/// Column positions used to read schedule rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub day: Option<usize>,
    pub slot: Option<usize>,
    pub urls: usize,
    pub kind: Option<usize>,
    pub date: Option<usize>,
    pub name: Option<usize>,
    pub has_header: bool,
}

impl ColumnLayout {
    /// Layout of a sheet without a header row
    pub const POSITIONAL: ColumnLayout = ColumnLayout {
        day: Some(0),
        slot: Some(1),
        urls: 2,
        kind: None,
        date: None,
        name: None,
        has_header: false,
    };

    /// Resolve the layout from the first record of the sheet
    ///
    /// A header row without a `photo_urls` column makes the whole sheet unusable.
    pub fn detect(first: &StringRecord) -> BoardResult<Self> {
        let headers: Vec<String> = first.iter().map(|cell| cell.trim().to_lowercase()).collect();

        if !headers.iter().any(|cell| KNOWN_HEADERS.contains(&cell.as_str())) {
            return Ok(Self::POSITIONAL);
        }

        let find = |name: &str| headers.iter().position(|cell| cell == name);

        let urls = find("photo_urls")
            .ok_or_else(|| sheet_error("header row has no photo_urls column"))?;

        Ok(ColumnLayout {
            day: find("day_of_week"),
            slot: find("time_slot"),
            urls,
            kind: find("type"),
            date: find("date"),
            name: find("holiday_name").or_else(|| find("name")).or_else(|| find("title")),
            has_header: true,
        })
    }
}

/// Why a row was left out of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RowProblem {
    InvalidSlot { value: String },
    MissingHolidayDate { value: String },
    UnknownWeekday { value: String },
    Unreadable { message: String },
}

impl fmt::Display for RowProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowProblem::InvalidSlot { value } => write!(f, "invalid time slot \"{}\"", value),
            RowProblem::MissingHolidayDate { value } => {
                write!(f, "no usable holiday date in \"{}\"", value)
            }
            RowProblem::UnknownWeekday { value } => write!(f, "unknown day of week \"{}\"", value),
            RowProblem::Unreadable { message } => write!(f, "unreadable record: {}", message),
        }
    }
}

/// A skipped row and where it was in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub line: u64,
    #[serde(flatten)]
    pub problem: RowProblem,
}

/// What a row contributed to the schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Weekly(Weekday),
    Holiday(Vec<NaiveDate>),
    /// No photo URLs; silently ignored
    Blank,
}

/// Summary of one sheet parse
#[derive(Debug, Default)]
pub struct SheetReport {
    pub rows_read: usize,
    pub weekly_rows: usize,
    pub holiday_rows: usize,
    pub blank_rows: usize,
    pub issues: Vec<RowIssue>,
    /// Set when the sheet as a whole was unusable and the defaults were kept
    pub malformed: Option<Error>,
}

/// Weekly and holiday tables read from a sheet
#[derive(Debug)]
pub struct ParsedSheet {
    pub weekly: WeeklySchedule,
    pub holidays: HolidaySchedule,
    pub report: SheetReport,
}

impl ParsedSheet {
    fn defaults(defaults: &WeeklySchedule, report: SheetReport) -> Self {
        Self {
            weekly: defaults.clone(),
            holidays: HolidaySchedule::new(),
            report,
        }
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Apply one record to the schedule being built
pub fn interpret_row(
    record: &StringRecord,
    layout: &ColumnLayout,
    reference_year: i32,
    weekly: &mut WeeklySchedule,
    holidays: &mut HolidaySchedule,
) -> Result<RowOutcome, RowProblem> {
    let urls = parse_url_list(cell(record, Some(layout.urls)));
    if urls.is_empty() {
        return Ok(RowOutcome::Blank);
    }

    let slot_raw = cell(record, layout.slot);
    let selector: SlotSelector = normalize_slot(slot_raw).ok_or_else(|| RowProblem::InvalidSlot {
        value: slot_raw.to_string(),
    })?;

    let kind = cell(record, layout.kind).to_lowercase();
    let day_raw = cell(record, layout.day);
    let date_raw = cell(record, layout.date);

    if kind == "holiday" || (!date_raw.is_empty() && day_raw.is_empty()) {
        let dates = parse_date_list(date_raw, reference_year);
        if dates.is_empty() {
            return Err(RowProblem::MissingHolidayDate {
                value: date_raw.to_string(),
            });
        }

        let name = cell(record, layout.name);
        for date in &dates {
            holidays.apply(*date, selector, &urls);
            if !name.is_empty() {
                holidays.set_name(*date, name);
            }
        }
        return Ok(RowOutcome::Holiday(dates));
    }

    let day = parse_weekday(day_raw).ok_or_else(|| RowProblem::UnknownWeekday {
        value: day_raw.to_string(),
    })?;
    weekly.day_mut(day).apply(selector, &urls);
    Ok(RowOutcome::Weekly(day))
}

/// Parse a schedule sheet on top of the given weekly defaults
///
/// Rows that cannot be used are reported and skipped. An empty sheet or a
/// header row without `photo_urls` yields the defaults with `malformed` set.
pub fn parse_schedule_sheet(
    text: &str,
    defaults: &WeeklySchedule,
    reference_year: i32,
) -> ParsedSheet {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut report = SheetReport::default();
    let mut records = Vec::new();

    for result in reader.records() {
        match result {
            Ok(record) if record.iter().all(str::is_empty) => continue,
            Ok(record) => records.push(record),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warn!("Skipping unreadable photo sheet record at line {}: {}", line, e);
                report.issues.push(RowIssue {
                    line,
                    problem: RowProblem::Unreadable {
                        message: e.to_string(),
                    },
                });
            }
        }
    }

    let Some(first) = records.first() else {
        warn!("Photo schedule sheet is empty, using the default schedule");
        report.malformed = Some(sheet_error("sheet has no rows"));
        return ParsedSheet::defaults(defaults, report);
    };

    let layout = match ColumnLayout::detect(first) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("Photo schedule sheet headers are incomplete, using the default schedule");
            report.malformed = Some(e);
            return ParsedSheet::defaults(defaults, report);
        }
    };

    let mut weekly = defaults.clone();
    let mut holidays = HolidaySchedule::new();
    let data = if layout.has_header { &records[1..] } else { &records[..] };

    for record in data {
        report.rows_read += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match interpret_row(record, &layout, reference_year, &mut weekly, &mut holidays) {
            Ok(RowOutcome::Weekly(day)) => {
                debug!("Line {} applied to {:?}", line, day);
                report.weekly_rows += 1;
            }
            Ok(RowOutcome::Holiday(dates)) => {
                debug!("Line {} applied to {} holiday date(s)", line, dates.len());
                report.holiday_rows += 1;
            }
            Ok(RowOutcome::Blank) => report.blank_rows += 1,
            Err(problem) => {
                warn!("Skipping photo sheet line {}: {}", line, problem);
                report.issues.push(RowIssue { line, problem });
            }
        }
    }

    ParsedSheet {
        weekly,
        holidays,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::photo_schedule::defaults::DEFAULT_WEEKLY;
    use crate::components::photo_schedule::models::{SlotKey, TimeSlot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_detection_prefers_holiday_name() {
        let record = StringRecord::from(vec!["Type", "Date", "Title", "Holiday_Name", "Photo_URLs"]);
        let layout = ColumnLayout::detect(&record).unwrap();
        assert!(layout.has_header);
        assert_eq!(layout.name, Some(3));
        assert_eq!(layout.urls, 4);
        assert_eq!(layout.day, None);
    }

    #[test]
    fn test_positional_layout_without_header() {
        let record = StringRecord::from(vec!["Monday", "noon", "a.jpg"]);
        assert_eq!(ColumnLayout::detect(&record).unwrap(), ColumnLayout::POSITIONAL);
    }

    #[test]
    fn test_header_without_urls_is_malformed() {
        let record = StringRecord::from(vec!["day_of_week", "time_slot"]);
        assert!(matches!(
            ColumnLayout::detect(&record),
            Err(Error::MalformedSheet(_))
        ));
    }

    #[test]
    fn test_weekly_rows_override_defaults() {
        let text = "day_of_week,time_slot,photo_urls\nMonday,noon,a.jpg|b.jpg\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);

        let monday = parsed.weekly.day(Weekday::Mon).unwrap();
        assert_eq!(monday.get(SlotKey::Noon), Some(&strings(&["a.jpg", "b.jpg"])[..]));
        // Untouched slots keep the built-in photos
        assert_eq!(
            monday.get(SlotKey::Morning),
            DEFAULT_WEEKLY.day(Weekday::Mon).unwrap().get(SlotKey::Morning)
        );
        assert_eq!(parsed.report.weekly_rows, 1);
        assert!(parsed.report.malformed.is_none());
    }

    #[test]
    fn test_holiday_row_with_name() {
        let text = "type,date,holiday_name,time_slot,photo_urls\n\
                    holiday,2024-04-15 | 16/4,Passover,,p.jpg\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);

        for day in [date(2024, 4, 15), date(2024, 4, 16)] {
            let entry = parsed.holidays.get(day).unwrap();
            assert_eq!(entry.name.as_deref(), Some("Passover"));
            for key in [SlotKey::Morning, SlotKey::Night, SlotKey::All, SlotKey::Default] {
                assert_eq!(entry.slots.get(key), Some(&strings(&["p.jpg"])[..]));
            }
        }
        assert_eq!(parsed.report.holiday_rows, 1);
    }

    #[test]
    fn test_date_without_day_is_holiday() {
        let text = "day_of_week,date,time_slot,photo_urls\n,1/1/2025,evening,ny.jpg\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);
        let entry = parsed.holidays.get(date(2025, 1, 1)).unwrap();
        assert_eq!(entry.slots.get(SlotKey::Evening), Some(&strings(&["ny.jpg"])[..]));
        assert_eq!(entry.slots.get(SlotKey::Noon), None);
        assert_eq!(entry.name, None);
    }

    #[test]
    fn test_bad_rows_are_reported() {
        let text = "day_of_week,time_slot,photo_urls,type,date\n\
                    Monday,afternoon,x.jpg,,\n\
                    Funday,noon,x.jpg,,\n\
                    ,noon,x.jpg,holiday,nonsense\n\
                    Tuesday,noon,,,\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);

        assert_eq!(parsed.report.rows_read, 4);
        assert_eq!(parsed.report.blank_rows, 1);
        let problems: Vec<&RowProblem> = parsed.report.issues.iter().map(|i| &i.problem).collect();
        assert!(matches!(problems[0], RowProblem::InvalidSlot { .. }));
        assert!(matches!(problems[1], RowProblem::UnknownWeekday { .. }));
        assert!(matches!(problems[2], RowProblem::MissingHolidayDate { .. }));
        assert_eq!(parsed.report.issues[0].line, 2);
        assert!(parsed.holidays.is_empty());
        assert_eq!(parsed.weekly, *DEFAULT_WEEKLY);
    }

    #[test]
    fn test_last_writer_wins() {
        let text = "Friday,all,first.jpg\nFriday,night,second.jpg\nFriday,night,third.jpg\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);
        let friday = parsed.weekly.day(Weekday::Fri).unwrap();

        assert_eq!(friday.get(SlotKey::Night), Some(&strings(&["third.jpg"])[..]));
        assert_eq!(friday.get(TimeSlot::Morning.into()), Some(&strings(&["first.jpg"])[..]));
        assert_eq!(friday.get(SlotKey::Any), Some(&strings(&["first.jpg"])[..]));
    }

    #[test]
    fn test_later_holiday_name_overwrites() {
        let text = "type,date,name,time_slot,photo_urls\n\
                    holiday,2024-12-25,Christmas,,x.jpg\n\
                    holiday,2024-12-25,Xmas,noon,y.jpg\n";
        let parsed = parse_schedule_sheet(text, &DEFAULT_WEEKLY, 2024);
        let entry = parsed.holidays.get(date(2024, 12, 25)).unwrap();
        assert_eq!(entry.name.as_deref(), Some("Xmas"));
        assert_eq!(entry.slots.get(SlotKey::Noon), Some(&strings(&["y.jpg"])[..]));
        assert_eq!(entry.slots.get(SlotKey::Morning), Some(&strings(&["x.jpg"])[..]));
    }

    #[test]
    fn test_empty_and_headerless_urls_sheet_keep_defaults() {
        let parsed = parse_schedule_sheet("\n\n", &DEFAULT_WEEKLY, 2024);
        assert!(matches!(parsed.report.malformed, Some(Error::MalformedSheet(_))));
        assert_eq!(parsed.weekly, *DEFAULT_WEEKLY);

        let parsed = parse_schedule_sheet("day_of_week,time_slot\nMonday,noon\n", &DEFAULT_WEEKLY, 2024);
        assert!(parsed.report.malformed.is_some());
        assert!(parsed.holidays.is_empty());
    }

    #[test]
    fn test_quoted_cells_and_bom() {
        let text = "\u{feff}day_of_week,time_slot,photo_urls\n\"Sunday\",\"morning\",\"a.jpg | b.jpg\"\n";
        let parsed = parse_schedule_sheet(text, &WeeklySchedule::new(), 2024);
        let sunday = parsed.weekly.day(Weekday::Sun).unwrap();
        assert_eq!(sunday.get(SlotKey::Morning), Some(&strings(&["a.jpg", "b.jpg"])[..]));
    }
}
