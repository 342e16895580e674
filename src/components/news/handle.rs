use super::actor::{NewsActor, NewsActorHandle};
use super::models::{NewsBatch, NewsSnapshot};
use crate::components::Services;
use crate::config::Config;
use crate::error::BoardResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the news ticker
#[derive(Clone)]
pub struct NewsHandle {
    actor_handle: NewsActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl NewsHandle {
    /// Create a new NewsHandle and spawn the actor
    pub fn new(config: &Config, services: Services) -> Self {
        let (mut actor, handle) = NewsActor::new(config, services.fetcher, services.cache);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    pub async fn refresh(&self) -> BoardResult<NewsSnapshot> {
        self.actor_handle.refresh().await
    }

    pub async fn snapshot(&self) -> BoardResult<NewsSnapshot> {
        self.actor_handle.snapshot().await
    }

    pub async fn batch(&self) -> BoardResult<NewsBatch> {
        self.actor_handle.batch().await
    }

    pub async fn advance(&self) -> BoardResult<()> {
        self.actor_handle.advance().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::cache::{get_json, keys, set_json, CacheStore, MemoryCache};
    use crate::components::fetch::Fetcher;
    use crate::components::news::models::{CachedNews, NewsItem, NewsStatus};
    use crate::error::transport_error;
    use crate::utils::clock::{FixedClock, SimulatedClock};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const FEED: &str = "https://news.example.com/rss";

    #[derive(Default)]
    struct MockFetcher {
        bodies: Mutex<HashMap<String, String>>,
    }

    impl MockFetcher {
        fn serve(&self, url: &str, body: &str) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_string());
        }

        fn fail(&self, url: &str) {
            self.bodies.lock().unwrap().remove(url);
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch_text(&self, url: &str) -> BoardResult<String> {
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| transport_error("offline"))
        }
    }

    fn feed(count: usize) -> String {
        let items: String = (0..count)
            .map(|i| format!("<item><title>story {}</title></item>", i))
            .collect();
        format!("<rss><channel>{}</channel></rss>", items)
    }

    /// Fetcher that holds every request until released
    struct GatedFetcher {
        gate: Arc<Notify>,
        body: String,
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch_text(&self, _url: &str) -> BoardResult<String> {
            self.gate.notified().await;
            Ok(self.body.clone())
        }
    }

    fn start(fetcher: Arc<dyn Fetcher>, cache: Arc<MemoryCache>) -> NewsHandle {
        let config = Config {
            fallback_feed_url: FEED.to_string(),
            ..Config::default()
        };
        let services = Services {
            fetcher,
            cache,
            clock: SimulatedClock::new(Arc::new(FixedClock::new(Utc::now().naive_utc())), false),
        };
        NewsHandle::new(&config, services)
    }

    fn setup() -> (Arc<MockFetcher>, Arc<MemoryCache>, NewsHandle) {
        let fetcher = Arc::new(MockFetcher::default());
        let cache = Arc::new(MemoryCache::new());
        let handle = start(fetcher.clone(), cache.clone());
        (fetcher, cache, handle)
    }

    #[tokio::test]
    async fn test_fresh_items_are_cached() {
        let (fetcher, cache, handle) = setup();
        fetcher.serve(FEED, &feed(4));

        let snapshot = handle.refresh().await.unwrap();
        assert_eq!(snapshot.status, NewsStatus::Fresh);
        assert_eq!(snapshot.items.len(), 4);
        assert!(snapshot.notice.is_none());

        let cached = get_json::<CachedNews>(cache.as_ref(), keys::NEWS_ITEMS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.items, snapshot.items);
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_cached_items() {
        let (fetcher, cache, handle) = setup();
        let cached = CachedNews {
            items: vec![NewsItem {
                title: "old story".to_string(),
                link: "#".to_string(),
                description: "-".to_string(),
                pub_date: String::new(),
            }],
            timestamp: Utc.with_ymd_and_hms(2024, 4, 15, 8, 30, 0).unwrap(),
        };
        set_json(cache.as_ref(), keys::NEWS_ITEMS, &cached).await.unwrap();
        fetcher.fail(FEED);

        let snapshot = handle.refresh().await.unwrap();
        assert_eq!(snapshot.status, NewsStatus::Stale);
        assert_eq!(snapshot.items, cached.items);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Showing cached news from 15/04/2024 08:30")
        );
    }

    #[tokio::test]
    async fn test_empty_feed_without_cache_is_unavailable() {
        let (fetcher, cache, handle) = setup();
        fetcher.serve(FEED, &feed(0));

        let snapshot = handle.refresh().await.unwrap();
        assert_eq!(snapshot.status, NewsStatus::Unavailable);
        assert!(snapshot.items.is_empty());
        assert!(cache.get(keys::NEWS_ITEMS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ticker_rotation() {
        let (fetcher, _cache, handle) = setup();
        fetcher.serve(FEED, &feed(5));
        handle.refresh().await.unwrap();

        let batch = handle.batch().await.unwrap();
        assert_eq!(batch.total, 5);
        assert_eq!(batch.items[0].title, "story 0");

        handle.advance().await.unwrap();
        let batch = handle.batch().await.unwrap();
        assert_eq!(batch.offset, 3);
        let titles: Vec<_> = batch.items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["story 3", "story 4", "story 0"]);
    }

    #[tokio::test]
    async fn test_ticker_answers_during_slow_refresh() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(GatedFetcher {
            gate: gate.clone(),
            body: feed(2),
        });
        let handle = start(fetcher, Arc::new(MemoryCache::new()));

        let pending = tokio::spawn({
            let handle = handle.clone();
            async move { handle.refresh().await }
        });

        let batch = tokio::time::timeout(Duration::from_secs(1), handle.batch())
            .await
            .expect("batch waited for the refresh")
            .unwrap();
        assert_eq!(batch.status, NewsStatus::Loading);
        handle.advance().await.unwrap();

        gate.notify_one();
        let snapshot = pending.await.unwrap().unwrap();
        assert_eq!(snapshot.status, NewsStatus::Fresh);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(handle.batch().await.unwrap().offset, 0);
    }
}
