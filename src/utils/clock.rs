//! Board clock with operator overrides for test mode.

use crate::components::photo_schedule::models::{weekday_name, TimeSlot};
use crate::error::{override_error, BoardResult};
use crate::utils::time::slot_at;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Source of the local wall-clock time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Real time in the board timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    seconds: AtomicI64,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            seconds: AtomicI64::new(now.and_utc().timestamp()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.seconds.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        chrono::DateTime::from_timestamp(self.seconds.load(Ordering::SeqCst), 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}

/// Operator overrides; each part is set and cleared independently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverrideState {
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_opt_weekday")]
    pub day: Option<Weekday>,
    pub slot: Option<TimeSlot>,
}

impl OverrideState {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.day.is_none() && self.slot.is_none()
    }
}

/// The board's idea of "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moment {
    pub datetime: NaiveDateTime,
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub slot: TimeSlot,
    pub simulated: bool,
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

fn serialize_opt_weekday<S: serde::Serializer>(
    day: &Option<Weekday>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match day {
        Some(day) => serializer.serialize_some(weekday_name(*day)),
        None => serializer.serialize_none(),
    }
}

/// Shift `date` to `target` within its Sunday-started week
pub fn shift_to_weekday(date: NaiveDate, target: Weekday) -> NaiveDate {
    let offset = i64::from(target.num_days_from_sunday()) - i64::from(date.weekday().num_days_from_sunday());
    date + Duration::days(offset)
}

/// Wall clock that honours operator overrides when test mode is on
#[derive(Clone)]
pub struct SimulatedClock {
    base: Arc<dyn Clock>,
    enabled: bool,
    overrides: Arc<watch::Sender<OverrideState>>,
}

impl SimulatedClock {
    pub fn new(base: Arc<dyn Clock>, test_mode: bool) -> Self {
        let (sender, _) = watch::channel(OverrideState::default());
        Self {
            base,
            enabled: test_mode,
            overrides: Arc::new(sender),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn overrides(&self) -> OverrideState {
        *self.overrides.borrow()
    }

    /// Receive every override change
    pub fn subscribe(&self) -> watch::Receiver<OverrideState> {
        self.overrides.subscribe()
    }

    /// Wall-clock time with no overrides applied
    pub fn real_now(&self) -> NaiveDateTime {
        self.base.now()
    }

    /// Current moment, with overrides applied in test mode
    pub fn now(&self) -> Moment {
        let real = self.real_now();
        let overrides = if self.enabled {
            self.overrides()
        } else {
            OverrideState::default()
        };

        let date = match (overrides.date, overrides.day) {
            (Some(date), _) => date,
            (None, Some(day)) => shift_to_weekday(real.date(), day),
            (None, None) => real.date(),
        };

        let (time, slot) = match overrides.slot {
            Some(slot) => (
                NaiveTime::from_hms_opt(slot.representative_hour(), 0, 0).unwrap_or(real.time()),
                slot,
            ),
            None => (real.time(), slot_at(real)),
        };

        Moment {
            datetime: date.and_time(time),
            date,
            weekday: date.weekday(),
            slot,
            simulated: !overrides.is_empty(),
        }
    }

    fn update(&self, change: impl FnOnce(&mut OverrideState)) -> BoardResult<OverrideState> {
        if !self.enabled {
            return Err(override_error("overrides are only available in test mode"));
        }

        self.overrides.send_if_modified(|state| {
            let before = *state;
            change(state);
            *state != before
        });

        let state = self.overrides();
        info!("{}", status_line(&state, self.enabled));
        Ok(state)
    }

    /// Pin the date; the weekday override follows it
    pub fn set_date(&self, date: NaiveDate) -> BoardResult<OverrideState> {
        self.update(|state| {
            state.date = Some(date);
            state.day = Some(date.weekday());
        })
    }

    /// Pin the weekday; a pinned date on another weekday is dropped
    pub fn set_day(&self, day: Weekday) -> BoardResult<OverrideState> {
        self.update(|state| {
            if state.date.is_some_and(|date| date.weekday() != day) {
                state.date = None;
            }
            state.day = Some(day);
        })
    }

    pub fn set_slot(&self, slot: TimeSlot) -> BoardResult<OverrideState> {
        self.update(|state| state.slot = Some(slot))
    }

    /// Clear the date; the weekday override stays
    pub fn clear_date(&self) -> BoardResult<OverrideState> {
        self.update(|state| state.date = None)
    }

    /// Clear the weekday, and with it the date
    pub fn clear_day(&self) -> BoardResult<OverrideState> {
        self.update(|state| {
            state.day = None;
            state.date = None;
        })
    }

    pub fn clear_slot(&self) -> BoardResult<OverrideState> {
        self.update(|state| state.slot = None)
    }

    pub fn clear_all(&self) -> BoardResult<OverrideState> {
        self.update(|state| *state = OverrideState::default())
    }

    /// Operator readout of the active overrides
    pub fn status_line(&self) -> String {
        status_line(&self.overrides(), self.enabled)
    }
}

/// Render override state the way the operator panel shows it
pub fn status_line(state: &OverrideState, enabled: bool) -> String {
    if !enabled || state.is_empty() {
        return t!("override_status_none").to_string();
    }

    let mut parts = Vec::new();
    if let Some(date) = state.date {
        parts.push(t!("override_part_date", value = date).to_string());
    }
    if let Some(day) = state.day {
        parts.push(t!("override_part_day", value = weekday_name(day)).to_string());
    }
    if let Some(slot) = state.slot {
        parts.push(t!("override_part_slot", value = slot).to_string());
    }

    t!("override_status_active", overrides = parts.join(" | ")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn clock_at(now: NaiveDateTime, test_mode: bool) -> (Arc<FixedClock>, SimulatedClock) {
        let base = Arc::new(FixedClock::new(now));
        let clock = SimulatedClock::new(base.clone(), test_mode);
        (base, clock)
    }

    #[test]
    fn test_real_time_without_overrides() {
        // Wednesday 2024-04-17 19:59
        let (_, clock) = clock_at(at(2024, 4, 17, 19, 59), true);
        let moment = clock.now();
        assert_eq!(moment.weekday, Weekday::Wed);
        assert_eq!(moment.slot, TimeSlot::Evening);
        assert!(!moment.simulated);
    }

    #[test]
    fn test_weekday_override_stays_in_week() {
        // Wednesday; Sunday of that week is 2024-04-14
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), true);

        clock.set_day(Weekday::Sun).unwrap();
        assert_eq!(clock.now().date, NaiveDate::from_ymd_opt(2024, 4, 14).unwrap());

        clock.set_day(Weekday::Sat).unwrap();
        assert_eq!(clock.now().date, NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
    }

    #[test]
    fn test_clearing_weekday_reverts() {
        let (base, clock) = clock_at(at(2024, 4, 17, 10, 0), true);
        clock.set_day(Weekday::Fri).unwrap();
        assert_eq!(clock.now().weekday, Weekday::Fri);

        base.advance(Duration::hours(1));
        clock.clear_day().unwrap();
        let moment = clock.now();
        assert_eq!(moment.weekday, Weekday::Wed);
        assert_eq!(moment.datetime, at(2024, 4, 17, 11, 0));
    }

    #[test]
    fn test_date_override_syncs_weekday() {
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), true);
        let passover = NaiveDate::from_ymd_opt(2024, 4, 23).unwrap();

        let state = clock.set_date(passover).unwrap();
        assert_eq!(state.day, Some(Weekday::Tue));
        assert_eq!(clock.now().date, passover);

        // Clearing the date keeps the synced weekday
        clock.clear_date().unwrap();
        assert_eq!(clock.now().date, NaiveDate::from_ymd_opt(2024, 4, 16).unwrap());

        clock.set_date(passover).unwrap();
        clock.clear_day().unwrap();
        assert!(clock.overrides().is_empty());
    }

    #[test]
    fn test_other_weekday_drops_date() {
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), true);
        clock.set_date(NaiveDate::from_ymd_opt(2024, 4, 23).unwrap()).unwrap();

        let state = clock.set_day(Weekday::Tue).unwrap();
        assert!(state.date.is_some());

        let state = clock.set_day(Weekday::Mon).unwrap();
        assert_eq!(state.date, None);
        assert_eq!(clock.now().date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    }

    #[test]
    fn test_slot_override_pins_hour() {
        let (_, clock) = clock_at(at(2024, 4, 17, 3, 30), true);
        assert_eq!(clock.now().slot, TimeSlot::Night);

        for slot in TimeSlot::ALL {
            clock.set_slot(slot).unwrap();
            let moment = clock.now();
            assert_eq!(moment.slot, slot);
            assert_eq!(moment.datetime.hour(), slot.representative_hour());
            assert_eq!(moment.datetime.minute(), 0);
        }
    }

    #[test]
    fn test_real_now_ignores_overrides() {
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), true);
        clock.set_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
        clock.set_slot(TimeSlot::Night).unwrap();

        assert_eq!(clock.now().date.year(), 2025);
        assert_eq!(clock.real_now(), at(2024, 4, 17, 10, 0));
    }

    #[test]
    fn test_overrides_rejected_outside_test_mode() {
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), false);
        assert!(clock.set_day(Weekday::Fri).is_err());
        assert_eq!(clock.now().weekday, Weekday::Wed);
    }

    #[tokio::test]
    async fn test_changes_are_broadcast() {
        let (_, clock) = clock_at(at(2024, 4, 17, 10, 0), true);
        let mut rx = clock.subscribe();

        clock.set_slot(TimeSlot::Noon).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().slot, Some(TimeSlot::Noon));

        // Setting the same value again is not a change
        clock.set_slot(TimeSlot::Noon).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_status_line() {
        let state = OverrideState {
            date: None,
            day: Some(Weekday::Fri),
            slot: Some(TimeSlot::Night),
        };
        assert_eq!(
            status_line(&state, true),
            "Testing overrides → Day: Friday | Slot: night"
        );
        assert_eq!(
            status_line(&OverrideState::default(), true),
            "Testing overrides are disabled"
        );
    }
}
