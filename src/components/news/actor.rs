use super::feed::parse_feed;
use super::models::{CachedNews, FeedUrlSource, NewsBatch, NewsSnapshot, NewsStatus};
use super::source::FeedUrlResolver;
use super::ticker::NewsTicker;
use crate::components::cache::{get_json, keys, set_json, CacheStore};
use crate::components::fetch::Fetcher;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

/// The news actor that owns the ticker state
pub struct NewsActor {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn CacheStore>,
    resolver: Arc<Mutex<FeedUrlResolver>>,
    ticker: NewsTicker,
    snapshot: NewsSnapshot,
    max_items: usize,
    tz: Tz,
    locale: String,
    /// Last ticket handed to a refresh job
    issued: u64,
    /// Ticket of the refresh whose result is on the ticker
    applied: u64,
    command_rx: mpsc::Receiver<NewsCommand>,
    update_tx: mpsc::Sender<NewsUpdate>,
    update_rx: mpsc::Receiver<NewsUpdate>,
}

/// What a refresh found
enum FeedOutcome {
    Fresh(CachedNews),
    Cached(CachedNews),
    Unavailable,
}

/// Finished refresh waiting to be applied by the actor
struct NewsUpdate {
    ticket: u64,
    feed: Option<(String, FeedUrlSource)>,
    outcome: FeedOutcome,
    response_tx: mpsc::Sender<BoardResult<NewsSnapshot>>,
}

/// One refresh, detached from the mailbox so the ticker keeps answering
struct RefreshJob {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn CacheStore>,
    resolver: Arc<Mutex<FeedUrlResolver>>,
    max_items: usize,
    tz: Tz,
}

impl RefreshJob {
    async fn run(self) -> (Option<(String, FeedUrlSource)>, FeedOutcome) {
        let resolved = self
            .resolver
            .lock()
            .await
            .resolve(self.fetcher.as_ref(), self.cache.as_ref(), false)
            .await;
        let (url, source) = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("No RSS feed URL available: {}", e);
                return (None, self.from_cache().await);
            }
        };

        let items = match self.fetcher.fetch_text(&url).await {
            Ok(xml) => parse_feed(&xml, self.max_items, self.tz),
            Err(e) => Err(e),
        };

        let outcome = match items {
            Ok(items) if !items.is_empty() => {
                let cached = CachedNews {
                    items,
                    timestamp: Utc::now(),
                };
                if let Err(e) = set_json(self.cache.as_ref(), keys::NEWS_ITEMS, &cached).await {
                    warn!("Failed to cache news items: {}", e);
                }
                info!("Loaded {} news items from {}", cached.items.len(), url);
                FeedOutcome::Fresh(cached)
            }
            Ok(_) => {
                warn!("Feed {} returned no items, trying the cache", url);
                self.from_cache().await
            }
            Err(e) => {
                error!("Error fetching news from {}: {}", url, e);
                self.from_cache().await
            }
        };

        (Some((url, source)), outcome)
    }

    /// Last good items, if any were cached
    async fn from_cache(&self) -> FeedOutcome {
        match get_json::<CachedNews>(self.cache.as_ref(), keys::NEWS_ITEMS).await {
            Ok(Some(cached)) if !cached.items.is_empty() => FeedOutcome::Cached(cached),
            Ok(_) => FeedOutcome::Unavailable,
            Err(e) => {
                warn!("Failed to read cached news: {}", e);
                FeedOutcome::Unavailable
            }
        }
    }
}

/// Commands that can be sent to the news actor
pub enum NewsCommand {
    Refresh(mpsc::Sender<BoardResult<NewsSnapshot>>),
    Snapshot(mpsc::Sender<BoardResult<NewsSnapshot>>),
    Batch(mpsc::Sender<BoardResult<NewsBatch>>),
    Advance,
    Shutdown,
}

/// Handle for communicating with the news actor
#[derive(Clone)]
pub struct NewsActorHandle {
    command_tx: mpsc::Sender<NewsCommand>,
}

impl NewsActorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(mpsc::Sender<BoardResult<T>>) -> NewsCommand,
    ) -> BoardResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Fetch the feed again
    pub async fn refresh(&self) -> BoardResult<NewsSnapshot> {
        self.request(NewsCommand::Refresh).await
    }

    pub async fn snapshot(&self) -> BoardResult<NewsSnapshot> {
        self.request(NewsCommand::Snapshot).await
    }

    /// Items currently on the ticker
    pub async fn batch(&self) -> BoardResult<NewsBatch> {
        self.request(NewsCommand::Batch).await
    }

    /// Rotate the ticker to the next window
    pub async fn advance(&self) -> BoardResult<()> {
        self.command_tx
            .send(NewsCommand::Advance)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        let _ = self.command_tx.send(NewsCommand::Shutdown).await;
        Ok(())
    }
}

impl NewsActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<dyn CacheStore>,
    ) -> (Self, NewsActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (update_tx, update_rx) = mpsc::channel(8);

        let actor = Self {
            fetcher,
            cache,
            resolver: Arc::new(Mutex::new(FeedUrlResolver::new(
                config.news_feed_sheet_url.clone(),
                Some(config.fallback_feed_url.clone()).filter(|url| !url.is_empty()),
            ))),
            ticker: NewsTicker::new(config.news_display_items),
            snapshot: NewsSnapshot::default(),
            max_items: config.max_news_items,
            tz: config.tz(),
            locale: config.board_locale.clone(),
            issued: 0,
            applied: 0,
            command_rx,
            update_tx,
            update_rx,
        };

        (actor, NewsActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("News actor started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        NewsCommand::Refresh(response_tx) => self.spawn_refresh(response_tx),
                        NewsCommand::Snapshot(response_tx) => {
                            let _ = response_tx.send(Ok(self.snapshot.clone())).await;
                        }
                        NewsCommand::Batch(response_tx) => {
                            let _ = response_tx.send(Ok(self.batch())).await;
                        }
                        NewsCommand::Advance => {
                            self.ticker.advance(self.snapshot.items.len());
                        }
                        NewsCommand::Shutdown => {
                            info!("News actor shutting down");
                            break;
                        }
                    }
                }
                Some(update) = self.update_rx.recv() => {
                    let response_tx = update.response_tx.clone();
                    self.apply(update);
                    let _ = response_tx.send(Ok(self.snapshot.clone())).await;
                }
            }
        }

        info!("News actor shut down");
    }

    fn spawn_refresh(&mut self, response_tx: mpsc::Sender<BoardResult<NewsSnapshot>>) {
        self.issued += 1;
        let ticket = self.issued;
        let job = RefreshJob {
            fetcher: Arc::clone(&self.fetcher),
            cache: Arc::clone(&self.cache),
            resolver: Arc::clone(&self.resolver),
            max_items: self.max_items,
            tz: self.tz,
        };
        let update_tx = self.update_tx.clone();

        tokio::spawn(async move {
            let (feed, outcome) = job.run().await;
            let update = NewsUpdate {
                ticket,
                feed,
                outcome,
                response_tx,
            };
            if update_tx.send(update).await.is_err() {
                warn!("News actor stopped before refresh {} finished", ticket);
            }
        });
    }

    /// Put a finished refresh on the ticker unless a newer one already is
    fn apply(&mut self, update: NewsUpdate) {
        if update.ticket < self.applied {
            warn!(
                "Dropping news refresh {}, refresh {} is newer",
                update.ticket, self.applied
            );
            return;
        }
        self.applied = update.ticket;

        if let Some((url, source)) = update.feed {
            self.snapshot.feed_url = Some(url);
            self.snapshot.feed_url_source = Some(source);
        }

        match update.outcome {
            FeedOutcome::Fresh(cached) => {
                self.snapshot.status = NewsStatus::Fresh;
                self.snapshot.items = cached.items;
                self.snapshot.updated_at = Some(cached.timestamp);
                self.snapshot.notice = None;
            }
            FeedOutcome::Cached(cached) => {
                let timestamp = cached
                    .timestamp
                    .with_timezone(&self.tz)
                    .format("%d/%m/%Y %H:%M")
                    .to_string();
                info!("Showing {} cached news items from {}", cached.items.len(), timestamp);
                self.snapshot.status = NewsStatus::Stale;
                self.snapshot.items = cached.items;
                self.snapshot.updated_at = Some(cached.timestamp);
                self.snapshot.notice = Some(
                    t!("news_stale_notice", locale = self.locale.as_str(), timestamp = timestamp)
                        .to_string(),
                );
            }
            FeedOutcome::Unavailable => {
                self.snapshot.status = NewsStatus::Unavailable;
                self.snapshot.items.clear();
                self.snapshot.updated_at = None;
                self.snapshot.notice =
                    Some(t!("news_unavailable", locale = self.locale.as_str()).to_string());
            }
        }
        self.ticker.reset();
    }

    fn batch(&self) -> NewsBatch {
        NewsBatch {
            status: self.snapshot.status,
            items: self.ticker.batch(&self.snapshot.items),
            offset: self.ticker.offset(),
            total: self.snapshot.items.len(),
            notice: self.snapshot.notice.clone(),
            updated_at: self.snapshot.updated_at,
        }
    }
}
