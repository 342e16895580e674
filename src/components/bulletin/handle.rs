use super::actor::{BulletinActor, BulletinActorHandle};
use super::models::{MessagesView, TodoView};
use crate::components::fetch::Fetcher;
use crate::config::Config;
use crate::error::BoardResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the bulletin boxes
#[derive(Clone)]
pub struct BulletinHandle {
    actor_handle: BulletinActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl BulletinHandle {
    /// Create a new BulletinHandle and spawn the actor
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let (mut actor, handle) = BulletinActor::new(config, fetcher);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    pub async fn refresh_messages(&self) -> BoardResult<MessagesView> {
        self.actor_handle.refresh_messages().await
    }

    pub async fn refresh_todo(&self) -> BoardResult<TodoView> {
        self.actor_handle.refresh_todo().await
    }

    pub async fn messages(&self) -> BoardResult<MessagesView> {
        self.actor_handle.messages().await
    }

    pub async fn todo(&self) -> BoardResult<TodoView> {
        self.actor_handle.todo().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        self.actor_handle.shutdown().await
    }
}
