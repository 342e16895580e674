mod handle;
pub mod models;
mod scheduler;

pub use handle::PresenceHandle;
pub use models::{ViewMode, ViewState};

use super::Services;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use crate::utils::scheduler::Scheduler;
use async_trait::async_trait;
use scheduler::PresenceScheduler;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Admin presence view and remote reload trigger
#[derive(Default)]
pub struct Presence {
    handle: RwLock<Option<PresenceHandle>>,
    scheduler: RwLock<Option<PresenceScheduler>>,
}

impl Presence {
    pub const NAME: &'static str = "presence";

    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<PresenceHandle> {
        self.handle.read().await.clone()
    }
}

#[async_trait]
impl super::Component for Presence {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> BoardResult<()> {
        let handle = {
            let mut handle_lock = self.handle.write().await;
            if handle_lock.is_none() {
                let config = config.read().await;
                *handle_lock = Some(PresenceHandle::new(&config, services.fetcher));
            }
            handle_lock
                .clone()
                .ok_or_else(|| component_error("presence handle missing"))?
        };

        let mut scheduler_lock = self.scheduler.write().await;
        if scheduler_lock.is_some() {
            warn!("Presence scheduler is already running, skipping initialization");
            return Ok(());
        }

        info!("Starting presence scheduler");
        match PresenceScheduler::start(config, handle).await {
            Ok(scheduler) => *scheduler_lock = Some(scheduler),
            Err(e) => error!("Failed to start presence scheduler: {}", e),
        }

        Ok(())
    }

    async fn shutdown(&self) -> BoardResult<()> {
        if let Some(scheduler) = self.scheduler.write().await.take() {
            scheduler.stop().await?;
        }

        if let Some(handle) = &*self.handle.read().await {
            handle.shutdown().await?;
        }

        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
