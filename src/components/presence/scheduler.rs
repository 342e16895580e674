use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::handle::PresenceHandle;
use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::scheduler::{ScheduledTasks, Scheduler};

/// Presence and remote refresh polling
pub struct PresenceScheduler {
    tasks: ScheduledTasks,
}

impl Scheduler for PresenceScheduler {
    type Handle = PresenceHandle;

    fn start(
        config: Arc<RwLock<Config>>,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = BoardResult<Self>> + Send>> {
        Box::pin(async move {
            let (presence_secs, refresh_secs) = {
                let config = config.read().await;
                (
                    config.presence_poll_secs.max(1),
                    config.remote_refresh_poll_secs.max(1),
                )
            };
            let tasks = ScheduledTasks::new();

            if handle.polls_presence() {
                tasks.spawn(run_presence_loop(handle.clone(), presence_secs)).await;
            } else {
                info!("Admin status URL not configured, presence polling disabled");
            }

            if handle.polls_refresh_trigger() {
                tasks.spawn(run_trigger_loop(handle, refresh_secs)).await;
            } else {
                info!("Refresh trigger URL not configured, remote refresh disabled");
            }

            info!("Presence scheduler started with {} task(s)", tasks.len().await);
            Ok(Self { tasks })
        })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = BoardResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.tasks.abort_all().await;
            info!("Presence scheduler stopped");
            Ok(())
        })
    }
}

async fn run_presence_loop(handle: PresenceHandle, poll_secs: u64) {
    let mut ticker = interval(Duration::from_secs(poll_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = handle.check_presence().await {
            warn!("Presence check failed: {}", e);
        }
    }
}

async fn run_trigger_loop(handle: PresenceHandle, poll_secs: u64) {
    let mut ticker = interval(Duration::from_secs(poll_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match handle.check_refresh_trigger().await {
            Ok(_) => {}
            Err(e) => debug!("Error checking refresh status: {}", e),
        }
    }
}
