use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::handle::NewsHandle;
use super::models::NewsStatus;
use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::scheduler::{ScheduledTasks, Scheduler};

/// Periodic feed refresh and ticker rotation
pub struct NewsScheduler {
    tasks: ScheduledTasks,
}

impl Scheduler for NewsScheduler {
    type Handle = NewsHandle;

    fn start(
        config: Arc<RwLock<Config>>,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = BoardResult<Self>> + Send>> {
        Box::pin(async move {
            let (refresh_secs, cycle_secs) = {
                let config = config.read().await;
                (config.news_refresh_secs.max(1), config.news_cycle_secs.max(1))
            };
            let tasks = ScheduledTasks::new();

            tasks.spawn(run_refresh_loop(handle.clone(), refresh_secs)).await;
            tasks.spawn(run_cycle_loop(handle, cycle_secs)).await;

            info!(
                "News scheduler started, refreshing every {}s and rotating every {}s",
                refresh_secs, cycle_secs
            );
            Ok(Self { tasks })
        })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = BoardResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.tasks.abort_all().await;
            info!("News scheduler stopped");
            Ok(())
        })
    }
}

async fn run_refresh_loop(handle: NewsHandle, refresh_secs: u64) {
    let mut ticker = interval(Duration::from_secs(refresh_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match handle.refresh().await {
            Ok(snapshot) => match snapshot.status {
                NewsStatus::Fresh => {}
                NewsStatus::Stale => warn!("News feed unavailable, showing cached items"),
                _ => warn!("News feed unavailable and nothing cached"),
            },
            Err(e) => error!("Failed to refresh news: {}", e),
        }
    }
}

async fn run_cycle_loop(handle: NewsHandle, cycle_secs: u64) {
    let period = Duration::from_secs(cycle_secs);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = handle.advance().await {
            error!("Failed to rotate news ticker: {}", e);
            break;
        }
    }
}
