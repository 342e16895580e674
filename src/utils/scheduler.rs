use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::BoardResult;

/// Trait for component schedulers that drive periodic refreshes
pub trait Scheduler: Send + Sync + 'static {
    /// The type of handle used by this scheduler
    type Handle: Clone + Send + Sync + 'static;

    /// Start the scheduler's background tasks
    fn start(
        config: Arc<RwLock<Config>>,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = BoardResult<Self>> + Send>>
    where
        Self: Sized;

    /// Stop the scheduler gracefully
    fn stop(&self) -> Pin<Box<dyn Future<Output = BoardResult<()>> + Send + '_>>;
}

/// Background tasks owned by a scheduler
#[derive(Default)]
pub struct ScheduledTasks {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ScheduledTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task that lives until the scheduler stops
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().await.push(tokio::spawn(task));
    }

    /// Abort every task
    pub async fn abort_all(&self) {
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_abort_all_stops_tasks() {
        let tasks = ScheduledTasks::new();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<u32>(8);

        tasks
            .spawn(async move {
                let mut n = 0;
                loop {
                    n += 1;
                    if tx.send(n).await.is_err() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await;
        assert_eq!(tasks.len().await, 1);
        assert_eq!(rx.recv().await, Some(1));

        tasks.abort_all().await;
        assert_eq!(tasks.len().await, 0);

        // The sender is dropped with the aborted task
        while rx.recv().await.is_some() {}
    }
}
