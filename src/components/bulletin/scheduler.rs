use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use super::handle::BulletinHandle;
use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::scheduler::{ScheduledTasks, Scheduler};

/// Periodic messages and todo refresh
pub struct BulletinScheduler {
    tasks: ScheduledTasks,
}

impl Scheduler for BulletinScheduler {
    type Handle = BulletinHandle;

    fn start(
        config: Arc<RwLock<Config>>,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = BoardResult<Self>> + Send>> {
        Box::pin(async move {
            let refresh_secs = config.read().await.bulletin_refresh_secs.max(1);
            let tasks = ScheduledTasks::new();

            tasks.spawn(run_refresh_loop(handle, refresh_secs)).await;

            info!("Bulletin scheduler started, refreshing every {}s", refresh_secs);
            Ok(Self { tasks })
        })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = BoardResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.tasks.abort_all().await;
            info!("Bulletin scheduler stopped");
            Ok(())
        })
    }
}

async fn run_refresh_loop(handle: BulletinHandle, refresh_secs: u64) {
    let mut ticker = interval(Duration::from_secs(refresh_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        // both boxes refresh independently; each keeps its old content on failure
        let (messages, todo) = tokio::join!(handle.refresh_messages(), handle.refresh_todo());
        if let Err(e) = messages {
            error!("Failed to refresh messages: {}", e);
        }
        if let Err(e) = todo {
            error!("Failed to refresh todo list: {}", e);
        }
    }
}
