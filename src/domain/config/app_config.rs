//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::device::QualityTier;
use crate::domain::library::SortKey;
use crate::domain::recording::{LimitMode, OutputFormat, RecordLimit};

/// Default channel count for new recordings
pub const DEFAULT_CHANNELS: u16 = 2;

/// Valid theme values
pub const VALID_THEMES: &[&str] = &["system", "light", "dark"];

/// Application configuration and remembered preferences.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_format: Option<String>,
    pub quality: Option<String>,
    pub channels: Option<u16>,
    pub limit_mode: Option<String>,
    /// Seconds or kilobytes depending on `limit_mode`; 0 is unlimited
    pub limit_value: Option<u64>,
    pub input_device: Option<String>,
    pub sort_mode: Option<String>,
    pub sort_reverse: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub recordings_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output_format: Some(OutputFormat::default().to_string()),
            quality: Some(QualityTier::default().to_string()),
            channels: Some(DEFAULT_CHANNELS),
            limit_mode: Some(LimitMode::default().to_string()),
            limit_value: Some(0),
            input_device: None,
            sort_mode: Some(SortKey::default().to_string()),
            sort_reverse: Some(false),
            theme: Some("system".to_string()),
            language: None,
            recordings_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_format: other.output_format.or(self.output_format),
            quality: other.quality.or(self.quality),
            channels: other.channels.or(self.channels),
            limit_mode: other.limit_mode.or(self.limit_mode),
            limit_value: other.limit_value.or(self.limit_value),
            input_device: other.input_device.or(self.input_device),
            sort_mode: other.sort_mode.or(self.sort_mode),
            sort_reverse: other.sort_reverse.or(self.sort_reverse),
            theme: other.theme.or(self.theme),
            language: other.language.or(self.language),
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
        }
    }

    /// Get output format, or the default if not set/invalid
    pub fn output_format_or_default(&self) -> OutputFormat {
        self.output_format
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get quality tier, or the default if not set/invalid
    pub fn quality_or_default(&self) -> QualityTier {
        self.quality
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get channel count, or stereo if not set/invalid
    pub fn channels_or_default(&self) -> u16 {
        self.channels
            .filter(|c| (1..=2).contains(c))
            .unwrap_or(DEFAULT_CHANNELS)
    }

    /// Get limit mode, or size if not set/invalid
    pub fn limit_mode_or_default(&self) -> LimitMode {
        self.limit_mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Remembered limit, `None` when unlimited or invalid
    pub fn limit(&self) -> Option<RecordLimit> {
        let value = self.limit_value.unwrap_or(0);
        if value == 0 {
            return None;
        }
        RecordLimit::new(self.limit_mode_or_default(), value).ok()
    }

    /// Get sort key, or date if not set/invalid
    pub fn sort_mode_or_default(&self) -> SortKey {
        self.sort_mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get sort direction, or ascending if not set
    pub fn sort_reverse_or_default(&self) -> bool {
        self.sort_reverse.unwrap_or(false)
    }

    /// Get theme, or "system" if not set
    pub fn theme_or_default(&self) -> &str {
        self.theme.as_deref().unwrap_or("system")
    }

    /// Recordings directory, or `<data dir>/sound-recorder/recordings`
    pub fn recordings_dir_or_default(&self) -> PathBuf {
        self.recordings_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sound-recorder")
                .join("recordings")
        })
    }

    /// Record the options of a started recording as last-used preferences
    pub fn remember_last_used(
        &mut self,
        format: OutputFormat,
        quality: QualityTier,
        channels: u16,
        limit: Option<RecordLimit>,
        input_device: Option<String>,
    ) {
        self.output_format = Some(format.to_string());
        self.quality = Some(quality.to_string());
        self.channels = Some(channels);
        match limit {
            Some(limit) => {
                self.limit_mode = Some(limit.mode().to_string());
                self.limit_value = Some(limit.value());
            }
            None => self.limit_value = Some(0),
        }
        if input_device.is_some() {
            self.input_device = input_device;
        }
    }
}
