use super::actor::{PhotoScheduleActor, PhotoScheduleActorHandle, RefreshSummary};
use super::defaults::DEFAULT_WEEKLY;
use super::models::ScheduleSnapshot;
use super::resolver::{preload_list, Resolution, Resolver};
use super::store::ScheduleStore;
use crate::components::Services;
use crate::config::Config;
use crate::error::BoardResult;
use crate::utils::clock::{OverrideState, SimulatedClock};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Handle for interacting with the photo schedule
#[derive(Clone)]
pub struct PhotoScheduleHandle {
    actor_handle: PhotoScheduleActorHandle,
    store: ScheduleStore,
    clock: SimulatedClock,
    _actor_task: Arc<JoinHandle<()>>,
}

impl PhotoScheduleHandle {
    /// Create a new PhotoScheduleHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, services: Services) -> Self {
        let store = ScheduleStore::new(DEFAULT_WEEKLY.clone());

        let (mut actor, handle) = PhotoScheduleActor::new(
            config,
            services.fetcher,
            services.clock.clone(),
            store.clone(),
        );

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            store,
            clock: services.clock,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Re-read the photo sheet
    pub async fn refresh(&self) -> BoardResult<RefreshSummary> {
        self.actor_handle.refresh().await
    }

    /// Carousel for the clock's current moment
    pub fn current(&self) -> Resolution {
        let moment = self.clock.now();
        let snapshot = self.store.current();
        Resolver::new(&snapshot, &DEFAULT_WEEKLY).resolve(moment.weekday, moment.date, moment.slot)
    }

    /// Every distinct URL worth preloading on the display
    pub fn preload_list(&self) -> Vec<String> {
        preload_list(&self.store.current())
    }

    pub fn snapshot(&self) -> Arc<ScheduleSnapshot> {
        self.store.current()
    }

    /// Receive every published schedule
    pub fn subscribe(&self) -> watch::Receiver<Arc<ScheduleSnapshot>> {
        self.store.subscribe()
    }

    /// Receive every override change
    pub fn subscribe_overrides(&self) -> watch::Receiver<OverrideState> {
        self.clock.subscribe()
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        self.actor_handle.shutdown().await
    }
}
