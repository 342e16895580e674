use tracing::warn;

/// Locales shipped under `locales/`
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "he"];

/// Set the display locale, falling back to English for unknown ones
pub fn set_locale(locale: &str) {
    let locale = locale.trim().to_lowercase();
    if SUPPORTED_LOCALES.contains(&locale.as_str()) {
        rust_i18n::set_locale(&locale);
    } else {
        warn!("Unsupported locale {}, using en", locale);
        rust_i18n::set_locale("en");
    }
}

/// Locale currently used for display strings
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}
