use super::AppState;
use crate::components::bulletin::{MessagesView, TodoView};
use crate::components::news::NewsBatch;
use crate::components::photo_schedule::models::{SnapshotSource, TimeSlot};
use crate::components::photo_schedule::normalize::parse_weekday;
use crate::components::photo_schedule::{RefreshSummary, Resolution, FADE_MS, ROTATION_SECS};
use crate::components::presence::ViewState;
use crate::error::Error;
use crate::utils::clock::{Moment, OverrideState};
use crate::utils::time::{format_clock_time, format_long_date};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Error body returned by every API route
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn disabled(component: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} is disabled", component),
        )
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Override(_) => StatusCode::FORBIDDEN,
            Error::Transport(_) | Error::Feed(_) | Error::MalformedSheet(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("API error {}: {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct ClockView {
    #[serde(flatten)]
    pub moment: Moment,
    pub time: String,
    pub long_date: String,
    pub test_mode: bool,
    pub override_status: String,
}

pub async fn clock(State(state): State<AppState>) -> Json<ClockView> {
    let moment = state.clock.now();
    Json(ClockView {
        time: format_clock_time(moment.datetime.time()),
        long_date: format_long_date(moment.date, &state.config.board_locale),
        test_mode: state.clock.is_enabled(),
        override_status: state.clock.status_line(),
        moment,
    })
}

#[derive(Debug, Serialize)]
pub struct PhotosView {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub generation: u64,
    pub source: SnapshotSource,
    pub rotation_secs: u64,
    pub fade_ms: u64,
}

pub async fn photos(State(state): State<AppState>) -> ApiResult<PhotosView> {
    let handle = state.photos.as_ref().ok_or_else(|| ApiError::disabled("photo_schedule"))?;
    let snapshot = handle.snapshot();
    Ok(Json(PhotosView {
        resolution: handle.current(),
        generation: snapshot.generation,
        source: snapshot.source.clone(),
        rotation_secs: ROTATION_SECS,
        fade_ms: FADE_MS,
    }))
}

pub async fn photos_preload(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let handle = state.photos.as_ref().ok_or_else(|| ApiError::disabled("photo_schedule"))?;
    Ok(Json(handle.preload_list()))
}

pub async fn photos_refresh(State(state): State<AppState>) -> ApiResult<RefreshSummary> {
    let handle = state.photos.as_ref().ok_or_else(|| ApiError::disabled("photo_schedule"))?;
    Ok(Json(handle.refresh().await?))
}

pub async fn news(State(state): State<AppState>) -> ApiResult<NewsBatch> {
    let handle = state.news.as_ref().ok_or_else(|| ApiError::disabled("news"))?;
    Ok(Json(handle.batch().await?))
}

pub async fn messages(State(state): State<AppState>) -> ApiResult<MessagesView> {
    let handle = state.bulletin.as_ref().ok_or_else(|| ApiError::disabled("bulletin"))?;
    Ok(Json(handle.messages().await?))
}

pub async fn todo(State(state): State<AppState>) -> ApiResult<TodoView> {
    let handle = state.bulletin.as_ref().ok_or_else(|| ApiError::disabled("bulletin"))?;
    Ok(Json(handle.todo().await?))
}

pub async fn view(State(state): State<AppState>) -> ApiResult<ViewState> {
    let handle = state.presence.as_ref().ok_or_else(|| ApiError::disabled("presence"))?;
    Ok(Json(handle.view().await))
}

#[derive(Debug, Serialize)]
pub struct OverridesView {
    pub enabled: bool,
    pub overrides: OverrideState,
    pub status: String,
}

fn overrides_view(state: &AppState) -> OverridesView {
    OverridesView {
        enabled: state.clock.is_enabled(),
        overrides: state.clock.overrides(),
        status: state.clock.status_line(),
    }
}

pub async fn get_overrides(State(state): State<AppState>) -> Json<OverridesView> {
    Json(overrides_view(&state))
}

pub async fn clear_overrides(State(state): State<AppState>) -> ApiResult<OverridesView> {
    state.clock.clear_all()?;
    Ok(Json(overrides_view(&state)))
}

/// Body of `PUT /api/overrides/{kind}`; a missing or blank value clears that part
#[derive(Debug, Default, Deserialize)]
pub struct OverrideValue {
    #[serde(default)]
    pub value: Option<String>,
}

pub async fn set_override(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<OverrideValue>,
) -> ApiResult<OverridesView> {
    if !state.clock.is_enabled() {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "overrides are only available in test mode",
        ));
    }

    let clock = &state.clock;
    let value = body.value.as_deref().map(str::trim).filter(|v| !v.is_empty());

    match (kind.as_str(), value) {
        ("date", Some(raw)) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("invalid date {:?}, expected YYYY-MM-DD", raw)))?;
            clock.set_date(date)?
        }
        ("date", None) => clock.clear_date()?,
        ("day", Some(raw)) => {
            let day = parse_weekday(raw)
                .ok_or_else(|| ApiError::bad_request(format!("invalid weekday {:?}", raw)))?;
            clock.set_day(day)?
        }
        ("day", None) => clock.clear_day()?,
        ("slot", Some(raw)) => {
            let slot = raw
                .parse::<TimeSlot>()
                .map_err(|_| ApiError::bad_request(format!("invalid slot {:?}", raw)))?;
            clock.set_slot(slot)?
        }
        ("slot", None) => clock.clear_slot()?,
        (other, _) => {
            return Err(ApiError::new(
                StatusCode::NOT_FOUND,
                format!("unknown override {:?}", other),
            ))
        }
    };

    Ok(Json(overrides_view(&state)))
}
