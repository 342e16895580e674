use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{error, info};

use super::handle::PhotoScheduleHandle;
use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::scheduler::{ScheduledTasks, Scheduler};
use crate::utils::time::{calculate_wait_duration, next_slot_boundary};

/// Periodic sheet refresh and carousel re-resolution
pub struct PhotoScheduleScheduler {
    tasks: ScheduledTasks,
}

impl Scheduler for PhotoScheduleScheduler {
    type Handle = PhotoScheduleHandle;

    fn start(
        config: Arc<RwLock<Config>>,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = BoardResult<Self>> + Send>> {
        Box::pin(async move {
            let refresh_secs = config.read().await.photo_refresh_secs.max(1);
            let tasks = ScheduledTasks::new();

            tasks.spawn(run_refresh_loop(handle.clone(), refresh_secs)).await;
            tasks.spawn(run_resolution_loop(handle)).await;

            info!("Photo schedule scheduler started, refreshing every {}s", refresh_secs);
            Ok(Self { tasks })
        })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = BoardResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.tasks.abort_all().await;
            info!("Photo schedule scheduler stopped");
            Ok(())
        })
    }
}

/// Refresh on startup and then every `refresh_secs`
async fn run_refresh_loop(handle: PhotoScheduleHandle, refresh_secs: u64) {
    let mut ticker = interval(Duration::from_secs(refresh_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match handle.refresh().await {
            Ok(summary) if !summary.published => {
                info!("Photo schedule generation {} was superseded", summary.generation);
            }
            Ok(_) => {}
            Err(e) => error!("Failed to refresh photo schedule: {}", e),
        }
    }
}

/// Re-resolve when the schedule, the overrides or the time slot change
async fn run_resolution_loop(handle: PhotoScheduleHandle) {
    let mut schedules = handle.subscribe();
    let mut overrides = handle.subscribe_overrides();

    loop {
        let resolution = handle.current();
        info!(
            "Carousel for {} {}: {:?} via {:?}{}",
            resolution.date,
            resolution.slot,
            resolution.photos,
            resolution.tier,
            resolution
                .holiday_name
                .as_deref()
                .map(|name| format!(" ({})", name))
                .unwrap_or_default()
        );

        let now = handle.clock().now().datetime;
        let wait = calculate_wait_duration(now, next_slot_boundary(now));

        tokio::select! {
            changed = schedules.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = overrides.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = sleep(Duration::from_secs(wait)) => {}
        }
    }
}
