//! RIFF/WAVE container writer
//!
//! The header is the canonical 44-byte PCM layout:
//!
//! ```text
//! "RIFF" u32le(36+L) "WAVE"
//! "fmt " u32le(16) u16le(1) u16le(channels) u32le(rate)
//!        u32le(byte_rate) u16le(block_align) u16le(bits)
//! "data" u32le(L)
//! ```
//!
//! PCM payloads are copied verbatim; nothing is resampled or transcoded.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

/// Largest payload whose RIFF size still fits in a u32
pub const MAX_WAV_PAYLOAD: u64 = u32::MAX as u64 - 36;

/// WAV writer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("Unsupported bits per sample: {0} (expected 8, 16, 24 or 32)")]
    UnsupportedBitsPerSample(u16),

    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    #[error("Sample rate must be positive")]
    InvalidSampleRate,

    #[error("Sample rate {0} Hz is too high for a WAV byte rate")]
    SampleRateTooHigh(u32),

    #[error("Payload of {len} bytes is not a whole number of {block_align}-byte frames")]
    MisalignedPayload { len: u64, block_align: u16 },

    #[error("Payload of {0} bytes does not fit in a WAV file")]
    PayloadTooLarge(u64),

    #[error("PCM source ended after {actual} of {expected} bytes")]
    ShortPayload { expected: u64, actual: u64 },

    #[error("WAV I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for WavError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Validated PCM stream description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

impl WavFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self, WavError> {
        if sample_rate == 0 {
            return Err(WavError::InvalidSampleRate);
        }
        if !(1..=2).contains(&channels) {
            return Err(WavError::UnsupportedChannels(channels));
        }
        if ![8, 16, 24, 32].contains(&bits_per_sample) {
            return Err(WavError::UnsupportedBitsPerSample(bits_per_sample));
        }
        // byte_rate must fit the header's u32 field
        let block_align = u32::from(channels * bits_per_sample / 8);
        if sample_rate.checked_mul(block_align).is_none() {
            return Err(WavError::SampleRateTooHigh(sample_rate));
        }
        Ok(Self {
            sample_rate,
            channels,
            bits_per_sample,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes per second of audio
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Bytes per frame (one sample for every channel)
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    /// Largest payload not above `limit` that ends on a frame boundary
    /// and still fits in the container
    pub fn aligned_cap(&self, limit: u64) -> u64 {
        let align = u64::from(self.block_align());
        let limit = limit.min(MAX_WAV_PAYLOAD);
        limit - limit % align
    }
}

/// Build the 44-byte header for a payload of `payload_len` bytes
pub fn wav_header(payload_len: u64, format: &WavFormat) -> Result<[u8; WAV_HEADER_LEN], WavError> {
    let block_align = format.block_align();
    if payload_len % u64::from(block_align) != 0 {
        return Err(WavError::MisalignedPayload {
            len: payload_len,
            block_align,
        });
    }
    let data_len =
        u32::try_from(payload_len).map_err(|_| WavError::PayloadTooLarge(payload_len))?;
    let riff_len = data_len
        .checked_add(36)
        .ok_or(WavError::PayloadTooLarge(payload_len))?;

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_len.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());
    Ok(header)
}

/// Write a complete WAV file: header, then exactly `payload_len` bytes of `pcm`
pub fn write_wav<W, R>(
    out: &mut W,
    pcm: &mut R,
    payload_len: u64,
    format: &WavFormat,
) -> Result<(), WavError>
where
    W: Write + ?Sized,
    R: Read + ?Sized,
{
    let header = wav_header(payload_len, format)?;
    out.write_all(&header)?;
    let copied = io::copy(&mut pcm.take(payload_len), out)?;
    if copied != payload_len {
        return Err(WavError::ShortPayload {
            expected: payload_len,
            actual: copied,
        });
    }
    out.flush()?;
    Ok(())
}
