//! Recording infrastructure module
//!
//! WAV recordings are captured with cpal and written by the in-crate
//! container writer. Packaged codecs (AAC, Opus, AMR-WB) are encoded by an
//! FFmpeg child process.

mod cpal_encoder;
mod factory;
mod ffmpeg_encoder;
pub mod pcm;
pub mod wav;

pub use cpal_encoder::CpalEncoder;
pub use factory::PlatformEncoderFactory;
pub use ffmpeg_encoder::{FfmpegEncoder, FFMPEG_BINARY};
pub use pcm::PcmPacker;
pub use wav::{wav_header, write_wav, WavError, WavFormat, MAX_WAV_PAYLOAD, WAV_HEADER_LEN};
