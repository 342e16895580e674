//! Standalone RSS relay listening on `/rss-proxy`.

use signboard::config::Config;
use signboard::server::{self, rss_proxy};
use signboard::shutdown::wait_for_signal;
use signboard::startup;
use tracing::{error, info};

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    let config = Config::load()?;
    let relay = rss_proxy::RssRelay::new(&config.proxy_feed_url)?;
    info!(
        "RSS proxy on port {}, default feed {}",
        config.port, config.proxy_feed_url
    );

    server::serve(&config, rss_proxy::router(relay), async {
        if let Err(e) = wait_for_signal().await {
            error!("Failed to install signal handlers: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await?;

    Ok(())
}
