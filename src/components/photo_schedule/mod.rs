mod actor;
pub mod defaults;
mod handle;
pub mod models;
pub mod normalize;
pub mod resolver;
mod scheduler;
pub mod sheet;
pub mod store;

pub use actor::RefreshSummary;
pub use handle::PhotoScheduleHandle;
pub use resolver::{resolve_photos, Resolution};

/// Seconds each carousel photo stays on screen
pub const ROTATION_SECS: u64 = 15;

/// Cross-fade between carousel photos
pub const FADE_MS: u64 = 1000;

use super::Services;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use crate::utils::scheduler::Scheduler;
use async_trait::async_trait;
use scheduler::PhotoScheduleScheduler;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Photo carousel driven by the schedule sheet
#[derive(Default)]
pub struct PhotoSchedule {
    handle: RwLock<Option<PhotoScheduleHandle>>,
    scheduler: RwLock<Option<PhotoScheduleScheduler>>,
}

impl PhotoSchedule {
    pub const NAME: &'static str = "photo_schedule";

    /// Create a new photo schedule component
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<PhotoScheduleHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for PhotoSchedule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> BoardResult<()> {
        let handle = {
            let mut handle_lock = self.handle.write().await;
            if handle_lock.is_none() {
                *handle_lock = Some(PhotoScheduleHandle::new(config.clone(), services));
            }
            handle_lock
                .clone()
                .ok_or_else(|| component_error("photo schedule handle missing"))?
        };

        let mut scheduler_lock = self.scheduler.write().await;
        if scheduler_lock.is_some() {
            warn!("Photo schedule scheduler is already running, skipping initialization");
            return Ok(());
        }

        info!("Starting photo schedule scheduler");
        match PhotoScheduleScheduler::start(config, handle).await {
            Ok(scheduler) => *scheduler_lock = Some(scheduler),
            Err(e) => error!("Failed to start photo schedule scheduler: {}", e),
        }

        Ok(())
    }

    async fn shutdown(&self) -> BoardResult<()> {
        if let Some(scheduler) = self.scheduler.write().await.take() {
            scheduler.stop().await?;
        }

        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }

        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
