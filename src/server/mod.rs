//! HTTP surface for the display page.

pub mod api;
pub mod rss_proxy;

use crate::components::bulletin::Bulletin;
use crate::components::news::News;
use crate::components::photo_schedule::PhotoSchedule;
use crate::components::presence::Presence;
use crate::components::{
    BulletinHandle, ComponentManager, NewsHandle, PhotoScheduleHandle, PresenceHandle,
};
use crate::config::Config;
use crate::error::{config_error, BoardResult};
use crate::utils::clock::SimulatedClock;
use axum::{
    routing::{get, post, put},
    Router,
};
use rss_proxy::RssRelay;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: SimulatedClock,
    pub photos: Option<PhotoScheduleHandle>,
    pub news: Option<NewsHandle>,
    pub bulletin: Option<BulletinHandle>,
    pub presence: Option<PresenceHandle>,
}

impl AppState {
    /// Collect the handles of the initialized components
    pub async fn from_components(
        config: Arc<Config>,
        clock: SimulatedClock,
        manager: &ComponentManager,
    ) -> Self {
        let photos = match manager.get::<PhotoSchedule>(PhotoSchedule::NAME) {
            Some(component) => component.get_handle().await,
            None => None,
        };
        let news = match manager.get::<News>(News::NAME) {
            Some(component) => component.get_handle().await,
            None => None,
        };
        let bulletin = match manager.get::<Bulletin>(Bulletin::NAME) {
            Some(component) => component.get_handle().await,
            None => None,
        };
        let presence = match manager.get::<Presence>(Presence::NAME) {
            Some(component) => component.get_handle().await,
            None => None,
        };

        Self {
            config,
            clock,
            photos,
            news,
            bulletin,
            presence,
        }
    }
}

/// JSON API routes
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/clock", get(api::clock))
        .route("/api/photos", get(api::photos))
        .route("/api/photos/preload", get(api::photos_preload))
        .route("/api/photos/refresh", post(api::photos_refresh))
        .route("/api/news", get(api::news))
        .route("/api/messages", get(api::messages))
        .route("/api/todo", get(api::todo))
        .route("/api/view", get(api::view))
        .route(
            "/api/overrides",
            get(api::get_overrides).delete(api::clear_overrides),
        )
        .route("/api/overrides/{kind}", put(api::set_override))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Full application: API, RSS relay and the static display page
pub fn app(state: AppState, relay: RssRelay) -> Router {
    let static_dir = state.config.static_dir.clone();
    api_router(state)
        .merge(rss_proxy::routes(relay))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(config: &Config, app: Router, shutdown: F) -> BoardResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| config_error(&format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
