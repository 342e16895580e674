//! Flat key-value cache for the last good remote content.

mod memory;
mod redis_actor;

pub use memory::MemoryCache;
pub use redis_actor::{RedisActor, RedisActorHandle};

use crate::error::BoardResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

// Cache key constants
pub mod keys {
    pub const NEWS_ITEMS: &str = "signboard:news:items";
    pub const NEWS_FEED_URL: &str = "signboard:news:feed_url";
}

/// String key-value store
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> BoardResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> BoardResult<()>;
}

/// Read and deserialize a JSON value
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: &str,
) -> BoardResult<Option<T>> {
    match cache.get(key).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize and store a JSON value
pub async fn set_json<T: Serialize + Sync>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
) -> BoardResult<()> {
    let json = serde_json::to_string(value)?;
    cache.set(key, &json).await
}
