//! Audio encoder port interfaces

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{GeoLocation, OutputFormat, RecordOptions};

/// Status extra reported when a recording could not be started
pub const START_FAILURE_CODE: i32 = -1;

/// Recording errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordingError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Encoder not found: {0}. Please install it.")]
    EncoderNotFound(String),

    #[error("Unsupported encoder configuration: {0}")]
    UnsupportedConfig(String),

    #[error("Capture stream failed: {0}")]
    StreamFailed(String),

    #[error("Encoder exited with code {0}")]
    EncoderExited(i32),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),

    #[error("Recording I/O error: {0}")]
    Io(String),
}

impl RecordingError {
    /// Code carried as the extra of a FAILED status
    pub fn code(&self) -> i32 {
        match self {
            Self::StartFailed(_)
            | Self::NoAudioDevice
            | Self::DeviceNotFound(_)
            | Self::EncoderNotFound(_)
            | Self::UnsupportedConfig(_) => START_FAILURE_CODE,
            Self::StreamFailed(_) => -2,
            Self::EncoderExited(code) => *code,
            Self::FinalizeFailed(_) | Self::Io(_) => -3,
        }
    }
}

impl From<std::io::Error> for RecordingError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Everything an encoder needs to produce one output file
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Input device name; `None` selects the system default
    pub device: Option<String>,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    /// Hard cap on the payload, for encoders that can enforce it themselves
    pub max_bytes: Option<u64>,
    pub location: Option<GeoLocation>,
}

impl EncoderConfig {
    /// Target bitrate in bits per second
    pub fn bit_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(u32::from(self.bits_per_sample))
    }
}

impl From<&RecordOptions> for EncoderConfig {
    fn from(options: &RecordOptions) -> Self {
        Self {
            output: options.file().to_path_buf(),
            format: options.format(),
            device: options.device().map(str::to_string),
            sample_rate: options.sample_rate(),
            bits_per_sample: options.bits_per_sample(),
            channels: options.channels(),
            max_bytes: options.limit().and_then(|l| l.max_bytes()),
            location: options.location(),
        }
    }
}

/// Encoder liveness as seen by the limit watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderHealth {
    Running,
    /// The encoder stopped itself at its own size cap
    LimitReached,
    Failed(i32),
}

/// Port for one encoder instance producing one output file.
///
/// Lifecycle: `start` once, any number of `pause`/`resume`, then `finalize`.
/// Dropping an encoder without finalizing must release the device.
#[async_trait]
pub trait AudioEncoder: Send {
    /// Begin capturing and encoding
    async fn start(&mut self) -> Result<(), RecordingError>;

    /// Suspend capture, keeping the output open
    async fn pause(&mut self) -> Result<(), RecordingError>;

    /// Continue a paused capture
    async fn resume(&mut self) -> Result<(), RecordingError>;

    /// Stop capture and make the output file complete
    async fn finalize(&mut self) -> Result<(), RecordingError>;

    /// Encoded payload bytes so far
    fn bytes_written(&self) -> u64;

    /// Poll for asynchronous faults or self-termination
    fn health(&mut self) -> EncoderHealth;
}

/// Port for creating encoders
pub trait EncoderFactory: Send + Sync {
    /// Open an encoder for the given configuration without starting it
    fn open(&self, config: &EncoderConfig) -> Result<Box<dyn AudioEncoder>, RecordingError>;
}
