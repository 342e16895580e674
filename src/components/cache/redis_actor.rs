use super::CacheStore;
use crate::error::{cache_error, BoardResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The Redis actor that processes cache commands
pub struct RedisActor {
    client: RedisClient,
    connection: Option<ConnectionManager>,
    command_rx: mpsc::Receiver<RedisCommand>,
}

/// Commands that can be sent to the Redis actor
pub enum RedisCommand {
    Get(String, mpsc::Sender<BoardResult<Option<String>>>),
    Set(String, String, mpsc::Sender<BoardResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisActorHandle {
    command_tx: mpsc::Sender<RedisCommand>,
}

impl RedisActorHandle {
    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        let _ = self.command_tx.send(RedisCommand::Shutdown).await;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisActorHandle {
    async fn get(&self, key: &str) -> BoardResult<Option<String>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RedisCommand::Get(key.to_string(), response_tx))
            .await
            .map_err(|e| cache_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| cache_error("Response channel closed"))?
    }

    async fn set(&self, key: &str, value: &str) -> BoardResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(RedisCommand::Set(
                key.to_string(),
                value.to_string(),
                response_tx,
            ))
            .await
            .map_err(|e| cache_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| cache_error("Response channel closed"))?
    }
}

impl RedisActor {
    /// Create a new actor and return its handle
    ///
    /// The connection is opened on first use, so an unreachable server only
    /// fails individual cache calls.
    pub fn new(redis_url: &str) -> BoardResult<(Self, RedisActorHandle)> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| cache_error(&format!("Failed to create Redis client: {}", e)))?;
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            client,
            connection: None,
            command_rx,
        };

        Ok((actor, RedisActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Redis actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RedisCommand::Get(key, response_tx) => {
                    let result = self.get_value(&key).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Set(key, value, response_tx) => {
                    let result = self.set_value(&key, &value).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    /// Get the shared connection, connecting if needed
    async fn connection(&mut self) -> BoardResult<&mut ConnectionManager> {
        if self.connection.is_none() {
            let manager = ConnectionManager::new(self.client.clone())
                .await
                .map_err(|e| cache_error(&format!("Failed to connect to Redis: {}", e)))?;
            self.connection = Some(manager);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| cache_error("Redis connection unavailable"))
    }

    async fn get_value(&mut self, key: &str) -> BoardResult<Option<String>> {
        let conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            warn!("Redis GET {} failed: {}", key, e);
            cache_error(&format!("Failed to read {} from Redis: {}", key, e))
        })?;
        Ok(value)
    }

    async fn set_value(&mut self, key: &str, value: &str) -> BoardResult<()> {
        let conn = self.connection().await?;
        () = conn.set(key, value).await.map_err(|e| {
            warn!("Redis SET {} failed: {}", key, e);
            cache_error(&format!("Failed to save {} to Redis: {}", key, e))
        })?;
        Ok(())
    }
}
