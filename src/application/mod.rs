//! Application layer - Use cases and port interfaces
//!
//! Contains the core recording operations and trait definitions
//! for external system interactions.

pub mod ports;
pub mod recording;

// Re-export use cases
pub use recording::{ListenerId, RecordingService, StatusListener, DEFAULT_POLL_INTERVAL};
