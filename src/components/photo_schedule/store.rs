use super::models::{HolidaySchedule, ScheduleSnapshot, SnapshotSource, WeeklySchedule};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Issued when a refresh starts; only the newest ticket may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

struct StoreInner {
    sender: watch::Sender<Arc<ScheduleSnapshot>>,
    next_ticket: AtomicU64,
}

/// Holds the current schedule snapshot and hands it out wholesale
#[derive(Clone)]
pub struct ScheduleStore {
    inner: Arc<StoreInner>,
}

impl ScheduleStore {
    /// Create a store seeded with the given weekly table
    pub fn new(defaults: WeeklySchedule) -> Self {
        let (sender, _) = watch::channel(Arc::new(ScheduleSnapshot::from_defaults(defaults)));
        Self {
            inner: Arc::new(StoreInner {
                sender,
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    pub fn current(&self) -> Arc<ScheduleSnapshot> {
        self.inner.sender.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<ScheduleSnapshot>> {
        self.inner.sender.subscribe()
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.inner.next_ticket.fetch_add(1, Ordering::SeqCst))
    }

    /// Replace the snapshot unless a newer refresh already published
    ///
    /// Returns whether the snapshot was installed.
    pub fn publish(
        &self,
        ticket: RefreshTicket,
        source: SnapshotSource,
        weekly: WeeklySchedule,
        holidays: HolidaySchedule,
    ) -> bool {
        let mut replacement = Some(ScheduleSnapshot {
            generation: ticket.0,
            source,
            weekly,
            holidays,
        });

        let installed = self.inner.sender.send_if_modified(|current| {
            if ticket.0 <= current.generation {
                return false;
            }
            match replacement.take() {
                Some(snapshot) => {
                    *current = Arc::new(snapshot);
                    true
                }
                None => false,
            }
        });

        if installed {
            info!("Published photo schedule generation {}", ticket.0);
        } else {
            debug!("Discarded stale photo schedule generation {}", ticket.0);
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::photo_schedule::models::{SlotSelector, SlotKey};
    use chrono::Weekday;

    fn weekly_with(url: &str) -> WeeklySchedule {
        let mut weekly = WeeklySchedule::new();
        weekly
            .day_mut(Weekday::Mon)
            .apply(SlotSelector::All, &[url.to_string()]);
        weekly
    }

    fn monday_url(store: &ScheduleStore) -> Option<String> {
        store
            .current()
            .weekly
            .day(Weekday::Mon)
            .and_then(|t| t.get(SlotKey::All))
            .map(|urls| urls[0].clone())
    }

    #[test]
    fn test_seeded_with_defaults() {
        let store = ScheduleStore::new(weekly_with("seed.jpg"));
        let snapshot = store.current();
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.source, SnapshotSource::Defaults);
        assert_eq!(monday_url(&store).as_deref(), Some("seed.jpg"));
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let store = ScheduleStore::new(WeeklySchedule::new());
        let older = store.begin_refresh();
        let newer = store.begin_refresh();

        assert!(store.publish(newer, SnapshotSource::Defaults, weekly_with("new.jpg"), HolidaySchedule::new()));
        assert!(!store.publish(older, SnapshotSource::Defaults, weekly_with("old.jpg"), HolidaySchedule::new()));

        assert_eq!(monday_url(&store).as_deref(), Some("new.jpg"));
        assert_eq!(store.current().generation, newer.generation());
    }

    #[tokio::test]
    async fn test_subscribers_see_whole_snapshots() {
        let store = ScheduleStore::new(WeeklySchedule::new());
        let mut rx = store.subscribe();

        let ticket = store.begin_refresh();
        store.publish(ticket, SnapshotSource::Defaults, weekly_with("a.jpg"), HolidaySchedule::new());

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.generation, ticket.generation());
        assert!(!snapshot.weekly.is_empty());
    }
}
