//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, FFmpeg and the filesystem.

pub mod config;
pub mod devices;
pub mod library;
pub mod recording;

// Re-export adapters
pub use config::XdgConfigStore;
pub use devices::CpalDeviceProvider;
pub use library::{DurationProbe, FsRecordingStore};
pub use recording::{CpalEncoder, FfmpegEncoder, PlatformEncoderFactory};
