//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod device;
pub mod error;
pub mod library;
pub mod recording;

// Re-export common types
pub use config::AppConfig;
pub use device::{DeviceCapabilities, FormatSelection, QualityTier};
pub use error::*;
pub use library::{AudioMimeType, RecordingEntry, SortKey};
pub use recording::{
    Duration, OutputFormat, RecordLimit, RecordOptions, RecordingSession, RecordingStatus,
    StatusEvent,
};
