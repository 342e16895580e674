use super::models::FeedUrlSource;
use crate::components::cache::{keys, CacheStore};
use crate::components::fetch::Fetcher;
use crate::error::{feed_error, BoardResult};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

/// How long a URL read from the feed sheet is trusted
pub const FEED_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// First cell of the first row holding an http(s) URL
pub fn first_feed_url(csv_text: &str) -> Option<String> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable feed sheet row: {}", e);
                continue;
            }
        };

        let Some(cell) = record.get(0).filter(|cell| !cell.is_empty()) else {
            continue;
        };

        match Url::parse(cell) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => return Some(cell.to_string()),
            Ok(url) => error!("Feed URL in sheet must use HTTP(S), got {}", url.scheme()),
            Err(e) => error!("Invalid feed URL {:?} in sheet: {}", cell, e),
        }
    }

    None
}

/// Works out which RSS feed the ticker should read
pub struct FeedUrlResolver {
    sheet_url: Option<String>,
    fallback: Option<String>,
    active: Option<(String, Instant)>,
}

impl FeedUrlResolver {
    pub fn new(sheet_url: Option<String>, fallback: Option<String>) -> Self {
        Self {
            sheet_url,
            fallback,
            active: None,
        }
    }

    /// URL in use, if any has been resolved
    pub fn active(&self) -> Option<&str> {
        self.active.as_ref().map(|(url, _)| url.as_str())
    }

    /// Resolve the feed URL
    ///
    /// A sheet URL is remembered for [`FEED_URL_TTL`] unless `force` is set.
    /// Otherwise the order is sheet, persisted URL, configured fallback; when
    /// the sheet fetch itself fails the last active URL is tried before the
    /// fallback.
    pub async fn resolve(
        &mut self,
        fetcher: &dyn Fetcher,
        cache: &dyn CacheStore,
        force: bool,
    ) -> BoardResult<(String, FeedUrlSource)> {
        if !force {
            if let Some((url, at)) = &self.active {
                if at.elapsed() < FEED_URL_TTL {
                    return Ok((url.clone(), FeedUrlSource::Remembered));
                }
            }
        }

        match self.read_sheet(fetcher).await {
            Ok(Some(url)) => {
                if let Err(e) = cache.set(keys::NEWS_FEED_URL, &url).await {
                    warn!("Failed to persist feed URL: {}", e);
                }
                self.remember(&url);
                Ok((url, FeedUrlSource::Sheet))
            }
            Ok(None) => {
                if let Some(url) = persisted_url(cache).await {
                    warn!("Feed sheet had no URL, using cached feed URL {}", url);
                    self.remember(&url);
                    return Ok((url, FeedUrlSource::Cached));
                }
                self.use_fallback()
            }
            Err(e) => {
                error!("Unable to read feed URL from sheet: {}", e);
                if let Some(url) = persisted_url(cache).await {
                    self.remember(&url);
                    return Ok((url, FeedUrlSource::Cached));
                }
                if let Some(url) = self.active() {
                    return Ok((url.to_string(), FeedUrlSource::LastActive));
                }
                self.use_fallback().map_err(|_| e)
            }
        }
    }

    async fn read_sheet(&self, fetcher: &dyn Fetcher) -> BoardResult<Option<String>> {
        let Some(sheet_url) = self.sheet_url.as_deref() else {
            debug!("Feed sheet is not configured, skipping");
            return Ok(None);
        };

        let text = fetcher.fetch_text(sheet_url).await?;
        if text.trim().is_empty() {
            error!("Feed sheet returned an empty payload");
            return Ok(None);
        }
        Ok(first_feed_url(&text))
    }

    fn use_fallback(&mut self) -> BoardResult<(String, FeedUrlSource)> {
        let url = self
            .fallback
            .clone()
            .ok_or_else(|| feed_error("No RSS feed URL available"))?;
        warn!("Falling back to configured feed URL {}", url);
        self.remember(&url);
        Ok((url, FeedUrlSource::Fallback))
    }

    fn remember(&mut self, url: &str) {
        self.active = Some((url.to_string(), Instant::now()));
    }
}

async fn persisted_url(cache: &dyn CacheStore) -> Option<String> {
    match cache.get(keys::NEWS_FEED_URL).await {
        Ok(value) => value.filter(|url| !url.trim().is_empty()),
        Err(e) => {
            warn!("Failed to read cached feed URL: {}", e);
            None
        }
    }
}
