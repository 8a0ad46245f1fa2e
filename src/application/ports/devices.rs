//! Input device port interface

use thiserror::Error;

use crate::domain::device::DeviceCapabilities;

/// Device enumeration errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Audio host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Failed to enumerate input devices: {0}")]
    EnumerationFailed(String),
}

/// Port for discovering capture devices and what they support
pub trait DeviceProvider: Send + Sync {
    /// Raw input device list; callers dedupe and order it
    fn input_devices(&self) -> Result<Vec<DeviceCapabilities>, DeviceError>;

    /// Name of the system default input, if any
    fn default_device_name(&self) -> Option<String>;
}
