mod actor;
mod handle;
pub mod models;
pub mod parse;
mod scheduler;

pub use handle::BulletinHandle;
pub use models::{Message, MessagesView, TodoTable, TodoView};

use super::Services;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use crate::utils::scheduler::Scheduler;
use async_trait::async_trait;
use scheduler::BulletinScheduler;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Team messages and todo/status table
#[derive(Default)]
pub struct Bulletin {
    handle: RwLock<Option<BulletinHandle>>,
    scheduler: RwLock<Option<BulletinScheduler>>,
}

impl Bulletin {
    pub const NAME: &'static str = "bulletin";

    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<BulletinHandle> {
        self.handle.read().await.clone()
    }
}

#[async_trait]
impl super::Component for Bulletin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> BoardResult<()> {
        let handle = {
            let mut handle_lock = self.handle.write().await;
            if handle_lock.is_none() {
                let config = config.read().await;
                *handle_lock = Some(BulletinHandle::new(&config, services.fetcher));
            }
            handle_lock
                .clone()
                .ok_or_else(|| component_error("bulletin handle missing"))?
        };

        let mut scheduler_lock = self.scheduler.write().await;
        if scheduler_lock.is_some() {
            warn!("Bulletin scheduler is already running, skipping initialization");
            return Ok(());
        }

        info!("Starting bulletin scheduler");
        match BulletinScheduler::start(config, handle).await {
            Ok(scheduler) => *scheduler_lock = Some(scheduler),
            Err(e) => error!("Failed to start bulletin scheduler: {}", e),
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
