//! Configuration value objects

mod app_config;

pub use app_config::{AppConfig, DEFAULT_CHANNELS, VALID_THEMES};
