use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// How long the admin view stays up after the last positive check
pub const ADMIN_VIEW_WINDOW: Duration = Duration::from_secs(2 * 60);

/// How often the display reloads itself regardless of triggers
pub const PAGE_RELOAD_SECS: u64 = 60 * 60;

pub const ADMIN_IMAGE: &str = "admin/images/admin_pic_01.jpg";
pub const ADMIN_AUDIO: &str = "admin/audio/track_01.mp3";
pub const NORMAL_AUDIO: &str = "audio/music_2.mp3";

/// Body of the admin status endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AdminStatus {
    #[serde(default)]
    pub admin_present: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Normal,
    Admin,
}

/// Tracks whether the admin view should be showing
#[derive(Debug, Clone, Copy)]
pub struct PresenceTracker {
    last_seen: Option<Instant>,
    window: Duration,
}

impl PresenceTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            last_seen: None,
            window,
        }
    }

    /// Record a presence check; a negative one ends the admin view at once
    pub fn observe(&mut self, present: bool, now: Instant) {
        self.last_seen = present.then_some(now);
    }

    pub fn mode(&self, now: Instant) -> ViewMode {
        match self.last_seen {
            Some(seen) if now.saturating_duration_since(seen) < self.window => ViewMode::Admin,
            _ => ViewMode::Normal,
        }
    }

    /// Seconds left in the admin view
    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        let seen = self.last_seen?;
        self.window
            .checked_sub(now.saturating_duration_since(seen))
            .filter(|left| !left.is_zero())
            .map(|left| left.as_secs())
    }
}

/// Reload generation bumped by the remote trigger file
#[derive(Debug, Clone, Copy, Default)]
pub struct ReloadTrigger {
    generation: u64,
}

impl ReloadTrigger {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bump the generation when the trimmed body reads `refresh`
    pub fn observe(&mut self, body: &str) -> bool {
        if body.trim() == "refresh" {
            self.generation += 1;
            true
        } else {
            false
        }
    }
}

/// What the display should play and show beside the carousel
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Replaces the carousel photo while set
    pub image: Option<String>,
    pub audio: String,
    pub admin_remaining_secs: Option<u64>,
    pub reload_generation: u64,
    pub page_reload_secs: u64,
}

impl ViewState {
    pub fn new(mode: ViewMode, remaining: Option<u64>, reload_generation: u64) -> Self {
        let (image, audio) = match mode {
            ViewMode::Admin => (Some(ADMIN_IMAGE.to_string()), ADMIN_AUDIO),
            ViewMode::Normal => (None, NORMAL_AUDIO),
        };
        Self {
            mode,
            image,
            audio: audio.to_string(),
            admin_remaining_secs: remaining.filter(|_| mode == ViewMode::Admin),
            reload_generation,
            page_reload_secs: PAGE_RELOAD_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_view_lapses_after_window() {
        let start = Instant::now();
        let mut tracker = PresenceTracker::new(ADMIN_VIEW_WINDOW);
        assert_eq!(tracker.mode(start), ViewMode::Normal);

        tracker.observe(true, start);
        assert_eq!(tracker.mode(start + Duration::from_secs(119)), ViewMode::Admin);
        assert_eq!(tracker.remaining_secs(start + Duration::from_secs(100)), Some(20));
        assert_eq!(tracker.mode(start + Duration::from_secs(120)), ViewMode::Normal);
    }

    #[test]
    fn test_positive_check_extends_and_negative_ends() {
        let start = Instant::now();
        let mut tracker = PresenceTracker::new(ADMIN_VIEW_WINDOW);
        tracker.observe(true, start);
        tracker.observe(true, start + Duration::from_secs(90));
        assert_eq!(tracker.mode(start + Duration::from_secs(150)), ViewMode::Admin);

        tracker.observe(false, start + Duration::from_secs(151));
        assert_eq!(tracker.mode(start + Duration::from_secs(151)), ViewMode::Normal);
        assert_eq!(tracker.remaining_secs(start + Duration::from_secs(151)), None);
    }

    #[test]
    fn test_reload_trigger() {
        let mut trigger = ReloadTrigger::default();
        assert!(!trigger.observe("idle"));
        assert!(trigger.observe("  refresh\n"));
        assert!(!trigger.observe("Refresh"));
        assert_eq!(trigger.generation(), 1);
    }

    #[test]
    fn test_view_assets() {
        let view = ViewState::new(ViewMode::Admin, Some(30), 2);
        assert_eq!(view.image.as_deref(), Some(ADMIN_IMAGE));
        assert_eq!(view.audio, ADMIN_AUDIO);

        let view = ViewState::new(ViewMode::Normal, Some(30), 2);
        assert!(view.image.is_none());
        assert_eq!(view.audio, NORMAL_AUDIO);
        assert_eq!(view.admin_remaining_secs, None);
    }
}
