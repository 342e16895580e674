use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed entry as shown on the ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// `DD/MM, HH:MM` in the board timezone, empty when the feed had no usable date
    pub pub_date: String,
}

/// Last good items, persisted in the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedNews {
    pub items: Vec<NewsItem>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsStatus {
    /// Nothing fetched yet
    Loading,
    /// Items from the latest fetch
    Fresh,
    /// Items restored from the cache after a failed or empty fetch
    Stale,
    /// No items and no cache
    Unavailable,
}

/// Where the active feed URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedUrlSource {
    Sheet,
    /// Resolved earlier and still within its TTL
    Remembered,
    Cached,
    LastActive,
    Fallback,
}

/// Full state of the news ticker
#[derive(Debug, Clone, Serialize)]
pub struct NewsSnapshot {
    pub status: NewsStatus,
    pub items: Vec<NewsItem>,
    pub updated_at: Option<DateTime<Utc>>,
    pub feed_url: Option<String>,
    pub feed_url_source: Option<FeedUrlSource>,
    /// Stale or error text for the display
    pub notice: Option<String>,
}

impl Default for NewsSnapshot {
    fn default() -> Self {
        Self {
            status: NewsStatus::Loading,
            items: Vec::new(),
            updated_at: None,
            feed_url: None,
            feed_url_source: None,
            notice: None,
        }
    }
}

/// Items currently on screen
#[derive(Debug, Clone, Serialize)]
pub struct NewsBatch {
    pub status: NewsStatus,
    pub items: Vec<NewsItem>,
    pub offset: usize,
    pub total: usize,
    pub notice: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
