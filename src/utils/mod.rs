pub mod clock;
pub mod i18n;
pub mod scheduler;
pub mod time;
