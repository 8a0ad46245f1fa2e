//! Quality tier to concrete sample rate / bit depth selection

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::OptionsError;

use super::{DeviceCapabilities, PcmEncoding};

/// Sample rates assumed when a device reports none
pub const FALLBACK_SAMPLE_RATES: [u32; 3] = [8_000, 44_100, 48_000];

/// Rate that standard quality is raised to when the device can do better
pub const STANDARD_SAMPLE_RATE: u32 = 44_100;

/// Bit depth for standard quality, always supported
pub const STANDARD_BITS: u16 = 16;

/// Coarse quality selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityTier {
    Low,
    #[default]
    Standard,
    High,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] = [Self::Low, Self::Standard, Self::High];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::High => "high",
        }
    }
}

impl FromStr for QualityTier {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "standard" | "std" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            _ => Err(OptionsError::InvalidQuality(s.to_string())),
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Concrete format to request from a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FormatSelection {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl fmt::Display for FormatSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}kHz / {}-bit",
            self.sample_rate as f64 / 1000.0,
            self.bits_per_sample
        )
    }
}

/// Candidate bit depths, ascending.
///
/// No reported encodings means everything is supported (8 and 32). Otherwise
/// 8 is offered if present, and the maximum starts at 16 and is raised to 24
/// by packed-24 or float, and to 32 by 32-bit integer.
pub fn bit_depths(caps: &DeviceCapabilities) -> Vec<u16> {
    if caps.encodings.is_empty() {
        return vec![8, 32];
    }

    let mut depths = Vec::with_capacity(2);
    if caps.encodings.contains(&PcmEncoding::Pcm8) {
        depths.push(8);
    }
    let max = caps
        .encodings
        .iter()
        .map(|e| match e {
            PcmEncoding::Pcm32 => 32,
            PcmEncoding::Pcm24 | PcmEncoding::PcmFloat => 24,
            PcmEncoding::Pcm8 | PcmEncoding::Pcm16 => STANDARD_BITS,
        })
        .max()
        .unwrap_or(STANDARD_BITS);
    depths.push(max);
    depths
}

/// Candidate sample rates, ascending and de-duplicated
pub fn sample_rates(caps: &DeviceCapabilities) -> Vec<u32> {
    let mut rates = if caps.sample_rates.is_empty() {
        FALLBACK_SAMPLE_RATES.to_vec()
    } else {
        caps.sample_rates.clone()
    };
    rates.sort_unstable();
    rates.dedup();
    rates
}

/// Pick the sample rate and bit depth for a quality tier.
///
/// - `High`: maximum rate and depth
/// - `Standard`: the middle rate, raised to 44.1kHz when below it and the
///   device goes higher; 16-bit
/// - `Low`: minimum rate and depth
pub fn select_format(caps: &DeviceCapabilities, tier: QualityTier) -> FormatSelection {
    let rates = sample_rates(caps);
    let depths = bit_depths(caps);

    // Both lists are non-empty by construction
    let min_rate = rates.first().copied().unwrap_or(STANDARD_SAMPLE_RATE);
    let max_rate = rates.last().copied().unwrap_or(STANDARD_SAMPLE_RATE);
    let min_bits = depths.first().copied().unwrap_or(STANDARD_BITS);
    let max_bits = depths.last().copied().unwrap_or(STANDARD_BITS);

    match tier {
        QualityTier::High => FormatSelection {
            sample_rate: max_rate,
            bits_per_sample: max_bits,
        },
        QualityTier::Standard => {
            let mut rate = rates[rates.len() / 2];
            if rate < STANDARD_SAMPLE_RATE && max_rate > STANDARD_SAMPLE_RATE {
                rate = STANDARD_SAMPLE_RATE;
            }
            FormatSelection {
                sample_rate: rate,
                bits_per_sample: STANDARD_BITS,
            }
        }
        QualityTier::Low => FormatSelection {
            sample_rate: min_rate,
            bits_per_sample: min_bits,
        },
    }
}
