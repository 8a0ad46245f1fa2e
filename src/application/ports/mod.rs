//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod devices;
pub mod encoder;
pub mod library;

// Re-export common types
pub use config::ConfigStore;
pub use devices::{DeviceError, DeviceProvider};
pub use encoder::{
    AudioEncoder, EncoderConfig, EncoderFactory, EncoderHealth, RecordingError,
    START_FAILURE_CODE,
};
pub use library::{RecordingStore, StoreError};
