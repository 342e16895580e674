use crate::components::bulletin::Bulletin;
use crate::components::cache::{CacheStore, MemoryCache, RedisActor, RedisActorHandle};
use crate::components::fetch::HttpFetcher;
use crate::components::news::News;
use crate::components::photo_schedule::PhotoSchedule;
use crate::components::presence::Presence;
use crate::components::{ComponentManager, Services};
use crate::config::Config;
use crate::error::Error;
use crate::server::{self, rss_proxy::RssRelay, AppState};
use crate::shutdown;
use crate::utils::clock::{SimulatedClock, SystemClock};
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Pick the cache backend: Redis when configured, memory otherwise
fn build_cache(config: &Config) -> (Arc<dyn CacheStore>, Option<RedisActorHandle>) {
    let Some(url) = config.redis_url.as_deref() else {
        info!("REDIS_URL not set, caching news in memory");
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        return (cache, None);
    };

    match RedisActor::new(url) {
        Ok((mut redis_actor, redis_handle)) => {
            // Spawn Redis actor task
            tokio::spawn(async move {
                redis_actor.run().await;
            });
            let cache: Arc<dyn CacheStore> = Arc::new(redis_handle.clone());
            (cache, Some(redis_handle))
        }
        Err(e) => {
            warn!("Failed to set up Redis, caching news in memory: {}", e);
            let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
            (cache, None)
        }
    }
}

/// Start the components and serve the display until a shutdown signal
pub async fn start_board(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let config_snapshot = Arc::new(config.read().await.clone());

    // Set locale from config
    crate::utils::i18n::set_locale(&config_snapshot.board_locale);
    info!("Display locale is {}", crate::utils::i18n::current_locale());

    if config_snapshot.test_mode {
        warn!("Test mode is on, date/day/slot overrides are accepted");
    }

    let (cache, redis_handle) = build_cache(&config_snapshot);
    let clock = SimulatedClock::new(
        Arc::new(SystemClock::new(config_snapshot.tz())),
        config_snapshot.test_mode,
    );
    let services = Services {
        fetcher: Arc::new(HttpFetcher::new()?),
        cache,
        clock: clock.clone(),
    };

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(PhotoSchedule::new());
    component_manager.register(News::new());
    component_manager.register(Bulletin::new());
    component_manager.register(Presence::new());

    if let Err(e) = component_manager.init_all(services).await {
        error!("Failed to initialize components: {:?}", e);
    }

    // Create a shared component manager
    let component_manager = Arc::new(component_manager);

    let state = AppState::from_components(
        Arc::clone(&config_snapshot),
        clock,
        &component_manager,
    )
    .await;
    let relay = RssRelay::new(&config_snapshot.proxy_feed_url)?;
    let app = server::app(state, relay);

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, redis_handle).await;
    });

    server::serve(&config_snapshot, app, async {
        let _ = shutdown_recv.await;
        info!("Received shutdown signal, stopping HTTP server...");
    })
    .await?;

    info!("Signboard stopped");
    Ok(())
}
