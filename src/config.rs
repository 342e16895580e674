use crate::error::{env_error, BoardResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;

/// Feed used by the news ticker when the feed sheet yields nothing
pub const DEFAULT_FALLBACK_FEED_URL: &str = "https://rss.walla.co.il/feed/2686";

/// Feed relayed by `/rss-proxy` when the request carries no `url` parameter
pub const DEFAULT_PROXY_FEED_URL: &str = "https://rss.walla.co.il/feed/13438";

/// Path of the optional per-component switch file
pub const COMPONENTS_FILE: &str = "config/components.toml";

/// Main configuration structure for the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Published CSV export of the photo schedule sheet
    pub photo_sheet_url: Option<String>,
    /// Published CSV export of the team messages sheet
    pub messages_sheet_url: Option<String>,
    /// Published CSV export of the todo/status sheet
    pub todo_sheet_url: Option<String>,
    /// Published CSV export whose first cell holds the RSS feed URL
    pub news_feed_sheet_url: Option<String>,
    /// Feed used when the feed sheet and the cache both come up empty
    pub fallback_feed_url: String,
    /// Feed relayed by the RSS proxy when no `url` parameter is given
    pub proxy_feed_url: String,
    /// Endpoint answering `{"admin_present": bool}`
    pub admin_status_url: Option<String>,
    /// Remote file whose body `refresh` asks the page to reload
    pub refresh_trigger_url: Option<String>,
    /// Redis connection string; the in-memory cache is used when absent
    pub redis_url: Option<String>,
    /// Timezone for the clock and the photo slots
    pub timezone: String,
    /// Locale for display strings
    pub board_locale: String,
    /// Whether operator overrides of date/day/slot are honoured
    pub test_mode: bool,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory holding the display page and its assets
    pub static_dir: String,
    /// Seconds between photo schedule refreshes
    pub photo_refresh_secs: u64,
    /// Seconds between news refreshes
    pub news_refresh_secs: u64,
    /// Seconds between news ticker rotations
    pub news_cycle_secs: u64,
    /// Seconds between messages/todo refreshes
    pub bulletin_refresh_secs: u64,
    /// Seconds between admin presence checks
    pub presence_poll_secs: u64,
    /// Seconds between remote refresh checks
    pub remote_refresh_poll_secs: u64,
    /// Maximum number of team messages shown
    pub max_messages: usize,
    /// Maximum number of todo sheet rows read, header rows included
    pub max_todo_items: usize,
    /// Maximum number of feed items kept
    pub max_news_items: usize,
    /// Number of news items shown at once
    pub news_display_items: usize,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            photo_sheet_url: None,
            messages_sheet_url: None,
            todo_sheet_url: None,
            news_feed_sheet_url: None,
            fallback_feed_url: DEFAULT_FALLBACK_FEED_URL.to_string(),
            proxy_feed_url: DEFAULT_PROXY_FEED_URL.to_string(),
            admin_status_url: None,
            refresh_trigger_url: None,
            redis_url: None,
            timezone: "UTC".to_string(),
            board_locale: "en".to_string(),
            test_mode: false,
            bind_address: "127.0.0.1".to_string(),
            port: 8787,
            static_dir: "public".to_string(),
            photo_refresh_secs: 600,
            news_refresh_secs: 900,
            news_cycle_secs: 10,
            bulletin_refresh_secs: 300,
            presence_poll_secs: 1,
            remote_refresh_poll_secs: 60,
            max_messages: 10,
            max_todo_items: 16,
            max_news_items: 20,
            news_display_items: 3,
            components: default_components(),
        }
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("photo_schedule".to_string(), true);
    components.insert("news".to_string(), true);
    components.insert("bulletin".to_string(), true);
    components.insert("presence".to_string(), true);
    components
}

/// Read an optional variable, treating blank values as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read and parse a variable, keeping the default when it is unset
fn parsed_var<T: FromStr>(name: &str, default: T) -> BoardResult<T> {
    match optional_var(name) {
        Some(value) => value.parse::<T>().map_err(|_| env_error(name)),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BoardResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let timezone = optional_var("TIMEZONE").unwrap_or(defaults.timezone);
        if timezone.parse::<Tz>().is_err() {
            return Err(env_error("TIMEZONE"));
        }

        let test_mode = match optional_var("TEST_MODE") {
            Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
            None => false,
        };

        let mut components = defaults.components;
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            let file_components = toml::from_str::<HashMap<String, bool>>(&content)?;
            for (key, value) in file_components {
                components.insert(key, value);
            }
        }

        Ok(Config {
            photo_sheet_url: optional_var("PHOTO_SHEET_URL"),
            messages_sheet_url: optional_var("MESSAGES_SHEET_URL"),
            todo_sheet_url: optional_var("TODO_SHEET_URL"),
            news_feed_sheet_url: optional_var("NEWS_FEED_SHEET_URL"),
            fallback_feed_url: optional_var("FALLBACK_FEED_URL").unwrap_or(defaults.fallback_feed_url),
            proxy_feed_url: optional_var("FEED_URL").unwrap_or(defaults.proxy_feed_url),
            admin_status_url: optional_var("ADMIN_STATUS_URL"),
            refresh_trigger_url: optional_var("REFRESH_TRIGGER_URL"),
            redis_url: optional_var("REDIS_URL"),
            timezone,
            board_locale: optional_var("BOARD_LOCALE").unwrap_or(defaults.board_locale),
            test_mode,
            bind_address: optional_var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parsed_var("PORT", defaults.port)?,
            static_dir: optional_var("STATIC_DIR").unwrap_or(defaults.static_dir),
            photo_refresh_secs: parsed_var("PHOTO_REFRESH_SECS", defaults.photo_refresh_secs)?,
            news_refresh_secs: parsed_var("NEWS_REFRESH_SECS", defaults.news_refresh_secs)?,
            news_cycle_secs: parsed_var("NEWS_CYCLE_SECS", defaults.news_cycle_secs)?,
            bulletin_refresh_secs: parsed_var("BULLETIN_REFRESH_SECS", defaults.bulletin_refresh_secs)?,
            presence_poll_secs: parsed_var("PRESENCE_POLL_SECS", defaults.presence_poll_secs)?,
            remote_refresh_poll_secs: parsed_var(
                "REMOTE_REFRESH_POLL_SECS",
                defaults.remote_refresh_poll_secs,
            )?,
            max_messages: parsed_var("MAX_MESSAGES", defaults.max_messages)?,
            max_todo_items: parsed_var("MAX_TODO_ITEMS", defaults.max_todo_items)?,
            max_news_items: parsed_var("MAX_NEWS_ITEMS", defaults.max_news_items)?,
            news_display_items: parsed_var("NEWS_DISPLAY_ITEMS", defaults.news_display_items)?,
            components,
        })
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }

    /// Parsed board timezone, UTC if the stored name is unknown
    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or(Tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_components_enabled() {
        let config = Config::default();
        assert!(config.is_component_enabled("photo_schedule"));
        assert!(config.is_component_enabled("news"));
        assert!(!config.is_component_enabled("unknown"));
    }

    #[test]
    fn test_timezone_fallback() {
        let mut config = Config::default();
        config.timezone = "Asia/Jerusalem".to_string();
        assert_eq!(config.tz(), Tz::Asia__Jerusalem);

        config.timezone = "Mars/Olympus".to_string();
        assert_eq!(config.tz(), Tz::UTC);
    }
}
