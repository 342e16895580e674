mod actor;
pub mod feed;
mod handle;
pub mod models;
mod scheduler;
pub mod source;
pub mod ticker;

pub use handle::NewsHandle;
pub use models::{NewsBatch, NewsItem, NewsSnapshot, NewsStatus};

use super::Services;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use crate::utils::scheduler::Scheduler;
use async_trait::async_trait;
use scheduler::NewsScheduler;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// News ticker fed from an RSS feed named in a sheet
#[derive(Default)]
pub struct News {
    handle: RwLock<Option<NewsHandle>>,
    scheduler: RwLock<Option<NewsScheduler>>,
}

impl News {
    pub const NAME: &'static str = "news";

    /// Create a new news component
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<NewsHandle> {
        self.handle.read().await.clone()
    }
}

#[async_trait]
impl super::Component for News {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> BoardResult<()> {
        let handle = {
            let mut handle_lock = self.handle.write().await;
            if handle_lock.is_none() {
                let config = config.read().await;
                *handle_lock = Some(NewsHandle::new(&config, services));
            }
            handle_lock
                .clone()
                .ok_or_else(|| component_error("news handle missing"))?
        };

        let mut scheduler_lock = self.scheduler.write().await;
        if scheduler_lock.is_some() {
            warn!("News scheduler is already running, skipping initialization");
            return Ok(());
        }

        info!("Starting news scheduler");
        match NewsScheduler::start(config, handle).await {
            Ok(scheduler) => *scheduler_lock = Some(scheduler),
            Err(e) => error!("Failed to start news scheduler: {}", e),
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
