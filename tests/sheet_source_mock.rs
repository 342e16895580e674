use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use signboard::components::cache::MemoryCache;
use signboard::components::fetch::Fetcher;
use signboard::components::photo_schedule::models::{SnapshotSource, TimeSlot};
use signboard::components::photo_schedule::resolver::LookupTier;
use signboard::components::photo_schedule::PhotoScheduleHandle;
use signboard::components::Services;
use signboard::config::Config;
use signboard::error::{transport_error, BoardResult};
use signboard::utils::clock::{FixedClock, SimulatedClock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const SHEET_URL: &str = "https://sheets.example.com/photos.csv";

/// Mock sheet source serving published CSV exports from memory
#[derive(Debug, Clone, Default)]
pub struct MockSheetSource {
    sheets: Arc<Mutex<HashMap<String, String>>>,
}

impl MockSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `csv` at `url`
    pub async fn publish(&self, url: &str, csv: &str) {
        self.sheets
            .lock()
            .await
            .insert(url.to_string(), csv.to_string());
    }

    /// Take `url` offline
    pub async fn unpublish(&self, url: &str) {
        self.sheets.lock().await.remove(url);
    }
}

#[async_trait]
impl Fetcher for MockSheetSource {
    async fn fetch_text(&self, url: &str) -> BoardResult<String> {
        self.sheets
            .lock()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| transport_error(&format!("{} responded with status 404", url)))
    }
}

fn monday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn setup(test_mode: bool) -> (MockSheetSource, PhotoScheduleHandle) {
    let source = MockSheetSource::new();
    let config = Config {
        photo_sheet_url: Some(SHEET_URL.to_string()),
        test_mode,
        ..Config::default()
    };
    let clock = SimulatedClock::new(Arc::new(FixedClock::new(monday_morning())), test_mode);
    let services = Services {
        fetcher: Arc::new(source.clone()),
        cache: Arc::new(MemoryCache::new()),
        clock,
    };
    let handle = PhotoScheduleHandle::new(Arc::new(RwLock::new(config)), services);
    (source, handle)
}

#[tokio::test]
async fn test_weekly_row_replaces_default_photos() {
    let (source, handle) = setup(false);
    source
        .publish(
            SHEET_URL,
            "day_of_week,time_slot,photo_urls\nMonday,morning,mon1.jpg|mon2.jpg\n",
        )
        .await;

    let summary = handle.refresh().await.unwrap();
    assert!(summary.published);
    assert_eq!(summary.weekly_rows, 1);
    assert!(matches!(summary.source, SnapshotSource::Sheet { .. }));

    let resolution = handle.current();
    assert_eq!(resolution.slot, TimeSlot::Morning);
    assert_eq!(resolution.tier, LookupTier::WeeklySlot);
    assert_eq!(resolution.photos, vec!["mon1.jpg", "mon2.jpg"]);
    assert!(handle.preload_list().contains(&"mon1.jpg".to_string()));
}

#[tokio::test]
async fn test_holiday_takes_precedence() {
    let (source, handle) = setup(false);
    source
        .publish(
            SHEET_URL,
            "type,date,holiday_name,time_slot,photo_urls\n\
             holiday,15/4/2024,Spring Day,,spring.jpg\n",
        )
        .await;

    handle.refresh().await.unwrap();

    let resolution = handle.current();
    assert!(resolution.tier.is_holiday());
    assert_eq!(resolution.photos, vec!["spring.jpg"]);
    assert_eq!(resolution.holiday_name.as_deref(), Some("Spring Day"));
}

#[tokio::test]
async fn test_transport_failure_keeps_last_schedule() {
    let (source, handle) = setup(false);
    source
        .publish(SHEET_URL, "Monday,morning,kept.jpg\n")
        .await;
    let first = handle.refresh().await.unwrap();

    source.unpublish(SHEET_URL).await;
    assert!(handle.refresh().await.is_err());

    assert_eq!(handle.snapshot().generation, first.generation);
    assert_eq!(handle.current().photos, vec!["kept.jpg"]);
}

#[tokio::test]
async fn test_malformed_sheet_publishes_defaults() {
    let (source, handle) = setup(false);
    source
        .publish(SHEET_URL, "day_of_week,time_slot\nMonday,morning\n")
        .await;

    let summary = handle.refresh().await.unwrap();
    assert!(summary.malformed.is_some());
    assert_eq!(summary.source, SnapshotSource::Defaults);
    assert_eq!(handle.current().tier, LookupTier::WeeklySlot);
    assert!(handle.current().photos[0].starts_with("images/carousel/"));
}

#[tokio::test]
async fn test_overrides_change_the_carousel() {
    let (source, handle) = setup(true);
    source
        .publish(SHEET_URL, "Friday,night,friday_night.jpg\n")
        .await;
    handle.refresh().await.unwrap();

    let mut overrides = handle.subscribe_overrides();
    handle.clock().set_day(Weekday::Fri).unwrap();
    handle.clock().set_slot(TimeSlot::Night).unwrap();
    assert!(overrides.has_changed().unwrap());

    let resolution = handle.current();
    assert_eq!(resolution.date, NaiveDate::from_ymd_opt(2024, 4, 19).unwrap());
    assert_eq!(resolution.photos, vec!["friday_night.jpg"]);

    handle.clock().clear_all().unwrap();
    assert_eq!(handle.current().date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
}

#[tokio::test]
async fn test_overrides_rejected_outside_test_mode() {
    let (_source, handle) = setup(false);
    assert!(handle.clock().set_slot(TimeSlot::Night).is_err());
    assert_eq!(handle.current().slot, TimeSlot::Morning);
}

#[tokio::test]
async fn test_yearless_holiday_keeps_real_year_under_date_override() {
    let (source, handle) = setup(true);
    source
        .publish(
            SHEET_URL,
            "type,date,holiday_name,time_slot,photo_urls\n\
             holiday,15/4,Spring,,spring.jpg\n",
        )
        .await;
    handle.refresh().await.unwrap();
    assert_eq!(handle.current().photos, vec!["spring.jpg"]);

    let clock = handle.clock().clone();
    clock
        .set_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .unwrap();
    handle.refresh().await.unwrap();
    clock.clear_all().unwrap();

    let resolution = handle.current();
    assert!(resolution.tier.is_holiday());
    assert_eq!(resolution.photos, vec!["spring.jpg"]);
    let holiday = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
    assert!(handle.snapshot().holidays.get(holiday).is_some());
}
