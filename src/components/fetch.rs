use crate::error::{transport_error, BoardResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Timeout applied to every remote fetch
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Retrieves the body of a published sheet, feed or status file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL as text; non-2xx responses are transport errors
    async fn fetch_text(&self, url: &str) -> BoardResult<String>;
}

/// `reqwest`-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> BoardResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> BoardResult<String> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(&format!(
                "{} responded with status {}",
                url, status
            )));
        }

        Ok(response.text().await?)
    }
}
