use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::clock::SimulatedClock;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

// Export components
pub mod bulletin;
pub mod cache;
pub mod fetch;
pub mod news;
pub mod photo_schedule;
pub mod presence;

// Re-export component handles
pub use bulletin::BulletinHandle;
pub use news::NewsHandle;
pub use photo_schedule::PhotoScheduleHandle;
pub use presence::PresenceHandle;

use cache::CacheStore;
use fetch::Fetcher;

/// Collaborators shared by every component
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn Fetcher>,
    pub cache: Arc<dyn CacheStore>,
    pub clock: SimulatedClock,
}

/// Component trait that all components must implement
#[async_trait]
pub trait Component: Send + Sync + Any {
    /// Get the name of the component
    fn name(&self) -> &'static str;

    /// Initialize the component
    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> BoardResult<()>;

    /// Shutdown the component
    async fn shutdown(&self) -> BoardResult<()>;

    /// Convert to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Manager for all components
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    config: Arc<RwLock<Config>>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("component_count", &self.components.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ComponentManager {
    /// Create a new component manager
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    /// Register a component
    pub fn register<T: Component + 'static>(&mut self, component: T) {
        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Initialize every enabled component
    pub async fn init_all(&self, services: Services) -> BoardResult<()> {
        for component in &self.components {
            let enabled = self.config.read().await.is_component_enabled(component.name());
            if !enabled {
                warn!("Component {} is disabled, skipping", component.name());
                continue;
            }

            info!("Initializing component: {}", component.name());

            if let Err(e) = component
                .init(Arc::clone(&self.config), services.clone())
                .await
            {
                // Log error but continue with other components
                tracing::error!("Error initializing component {}: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    /// Shutdown all components
    pub async fn shutdown_all(&self) -> BoardResult<()> {
        info!("Shutting down all components");

        for component in &self.components {
            info!("Shutting down component: {}", component.name());

            if let Err(e) = component.shutdown().await {
                // Log error but continue with other components
                tracing::error!(
                    "Error shutting down component {}: {:?}",
                    component.name(),
                    e
                );
            }
        }

        Ok(())
    }

    /// Get a component by name
    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Get a registered component by its concrete type
    pub fn get<T: Component>(&self, name: &str) -> Option<&T> {
        self.get_component_by_name(name)
            .and_then(|component| component.as_any().downcast_ref::<T>())
    }
}
