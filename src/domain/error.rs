//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a recording option is out of range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("Unsupported output format: \"{0}\". Valid formats are: m4a, ogg, 3gp, wav")]
    UnsupportedFormat(String),

    #[error("Invalid channel count {0}: must be 1 or 2")]
    InvalidChannels(u16),

    #[error("Invalid sample rate {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid bits per sample {0}")]
    InvalidBitsPerSample(u16),

    #[error("Invalid {mode} limit {value}: must be between 1 and {max}")]
    InvalidLimit { mode: String, value: u64, max: u64 },

    #[error("Invalid limit mode: \"{0}\". Valid modes are: size, time")]
    InvalidLimitMode(String),

    #[error("Invalid location {latitude},{longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid quality: \"{0}\". Valid qualities are: low, standard, high")]
    InvalidQuality(String),

    #[error("Missing output file")]
    MissingFile,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
