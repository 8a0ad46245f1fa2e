//! Encoder selection by output format

use tracing::debug;

use super::{CpalEncoder, FfmpegEncoder, FFMPEG_BINARY};
use crate::application::ports::{AudioEncoder, EncoderConfig, EncoderFactory, RecordingError};

/// Routes WAV to raw cpal capture and packaged codecs to ffmpeg
#[derive(Debug, Clone)]
pub struct PlatformEncoderFactory {
    ffmpeg_binary: String,
}

impl PlatformEncoderFactory {
    pub fn new() -> Self {
        Self::with_ffmpeg(FFMPEG_BINARY)
    }

    /// Use a specific ffmpeg executable for packaged formats
    pub fn with_ffmpeg(binary: impl Into<String>) -> Self {
        Self {
            ffmpeg_binary: binary.into(),
        }
    }
}

impl Default for PlatformEncoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderFactory for PlatformEncoderFactory {
    fn open(&self, config: &EncoderConfig) -> Result<Box<dyn AudioEncoder>, RecordingError> {
        if config.format.is_lossless() {
            debug!("using raw PCM capture");
            Ok(Box::new(CpalEncoder::new(config.clone())?))
        } else {
            debug!(binary = %self.ffmpeg_binary, "using ffmpeg encoder");
            Ok(Box::new(FfmpegEncoder::with_binary(
                config.clone(),
                self.ffmpeg_binary.clone(),
            )))
        }
    }
}
