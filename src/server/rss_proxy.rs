//! Server-side RSS relay for displays that cannot fetch feeds cross-origin.

use crate::error::BoardResult;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

pub const RELAY_PATH: &str = "/rss-proxy";
pub const RELAY_USER_AGENT: &str = "TV-WebApp RSS Proxy/1.0 (+https://github.com)";
const DEFAULT_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const RELAY_TIMEOUT_SECS: u64 = 30;

/// Fetches feeds on behalf of the display
#[derive(Clone)]
pub struct RssRelay {
    client: Client,
    default_feed: Arc<str>,
}

impl RssRelay {
    pub fn new(default_feed: &str) -> BoardResult<Self> {
        let client = Client::builder()
            .user_agent(RELAY_USER_AGENT)
            .timeout(Duration::from_secs(RELAY_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, default_feed))
    }

    /// Use an existing client; it should carry [`RELAY_USER_AGENT`]
    pub fn with_client(client: Client, default_feed: &str) -> Self {
        Self {
            client,
            default_feed: Arc::from(default_feed),
        }
    }

    /// Fetch `target` and forward it with the upstream status and content type
    pub async fn relay(&self, target: &str) -> Response {
        let allowed = Url::parse(target)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !allowed {
            return json_error(StatusCode::BAD_REQUEST, "Unsupported feed URL");
        }

        info!("Relaying RSS feed {}", target);
        let upstream = match self.client.get(target).send().await {
            Ok(upstream) => upstream,
            Err(e) => {
                error!("Error fetching RSS feed through proxy: {}", e);
                return json_error(StatusCode::BAD_GATEWAY, "Failed to fetch RSS feed");
            }
        };

        let status = upstream.status();
        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

        let body = match upstream.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Error reading RSS feed body: {}", e);
                return json_error(StatusCode::BAD_GATEWAY, "Failed to fetch RSS feed");
            }
        };
        info!("Forwarding {} bytes with status {}", body.len(), status);

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=120"),
        );
        response
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    let mut response = (status, Json(json!({ "error": message }))).into_response();
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// CORS preflight answer
pub fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}

async fn handle_relay(
    State(relay): State<RssRelay>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    let target = params
        .get("url")
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .unwrap_or(&*relay.default_feed)
        .to_string();
    relay.relay(&target).await
}

async fn not_found(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }
    json_error(StatusCode::NOT_FOUND, "Not Found")
}

/// The relay route alone, for mounting in a larger router
pub fn routes(relay: RssRelay) -> Router {
    Router::new()
        .route(RELAY_PATH, any(handle_relay))
        .with_state(relay)
}

/// Standalone relay: every other path is a JSON 404
pub fn router(relay: RssRelay) -> Router {
    routes(relay).fallback(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn relay() -> RssRelay {
        RssRelay::with_client(Client::new(), "https://feeds.example.com/rss")
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        let response = router(relay())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET,OPTIONS"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let response = router(relay())
            .oneshot(Request::builder().uri("/feed").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_rejects_non_http_targets() {
        let response = router(relay())
            .oneshot(
                Request::builder()
                    .uri("/rss-proxy?url=file%3A%2F%2F%2Fetc%2Fpasswd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
