use super::models::{
    AdminStatus, PresenceTracker, ReloadTrigger, ViewMode, ViewState, ADMIN_VIEW_WINDOW,
};
use crate::components::fetch::Fetcher;
use crate::config::Config;
use crate::error::{config_error, BoardResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct PresenceState {
    tracker: PresenceTracker,
    trigger: ReloadTrigger,
}

/// Handle for the admin presence view and the remote reload trigger
#[derive(Clone)]
pub struct PresenceHandle {
    fetcher: Arc<dyn Fetcher>,
    admin_status_url: Option<String>,
    refresh_trigger_url: Option<String>,
    state: Arc<RwLock<PresenceState>>,
}

impl PresenceHandle {
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            admin_status_url: config.admin_status_url.clone(),
            refresh_trigger_url: config.refresh_trigger_url.clone(),
            state: Arc::new(RwLock::new(PresenceState {
                tracker: PresenceTracker::new(ADMIN_VIEW_WINDOW),
                trigger: ReloadTrigger::default(),
            })),
        }
    }

    pub fn polls_presence(&self) -> bool {
        self.admin_status_url.is_some()
    }

    pub fn polls_refresh_trigger(&self) -> bool {
        self.refresh_trigger_url.is_some()
    }

    /// Check the admin status endpoint once
    ///
    /// A failed check leaves the current view as it is.
    pub async fn check_presence(&self) -> BoardResult<ViewState> {
        let url = self
            .admin_status_url
            .as_deref()
            .ok_or_else(|| config_error("Admin status URL is not configured"))?;

        let body = self.fetcher.fetch_text(url).await?;
        let status: AdminStatus = serde_json::from_str(&body)?;

        let now = Instant::now();
        let mut state = self.state.write().await;
        let before = state.tracker.mode(now);
        state.tracker.observe(status.admin_present, now);
        let after = state.tracker.mode(now);

        match (before, after) {
            (ViewMode::Normal, ViewMode::Admin) => info!("Admin connected, switching to alternate view"),
            (ViewMode::Admin, ViewMode::Normal) => info!("Admin left, restoring normal view"),
            _ => debug!("Admin present: {}", status.admin_present),
        }

        Ok(Self::view_of(&state, now))
    }

    /// Check the remote refresh trigger once; true when a reload was requested
    pub async fn check_refresh_trigger(&self) -> BoardResult<bool> {
        let url = self
            .refresh_trigger_url
            .as_deref()
            .ok_or_else(|| config_error("Refresh trigger URL is not configured"))?;

        let body = self.fetcher.fetch_text(url).await?;
        let mut state = self.state.write().await;
        let triggered = state.trigger.observe(&body);
        if triggered {
            info!(
                "Remote refresh triggered, reload generation {}",
                state.trigger.generation()
            );
        } else {
            debug!("No refresh triggered");
        }
        Ok(triggered)
    }

    /// Current view, with lapsed admin windows already expired
    pub async fn view(&self) -> ViewState {
        let state = self.state.read().await;
        Self::view_of(&state, Instant::now())
    }

    fn view_of(state: &PresenceState, now: Instant) -> ViewState {
        ViewState::new(
            state.tracker.mode(now),
            state.tracker.remaining_secs(now),
            state.trigger.generation(),
        )
    }

    /// Nothing to stop; polling lives in the scheduler
    pub async fn shutdown(&self) -> BoardResult<()> {
        if self.state.read().await.tracker.mode(Instant::now()) == ViewMode::Admin {
            warn!("Shutting down while the admin view is showing");
        }
        Ok(())
    }
}
