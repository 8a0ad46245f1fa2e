//! Input devices and format capability negotiation

mod capabilities;
mod negotiation;

pub use capabilities::{dedupe_devices, find_device, DeviceCapabilities, DeviceKind, PcmEncoding};
pub use negotiation::{
    bit_depths, sample_rates, select_format, FormatSelection, QualityTier, FALLBACK_SAMPLE_RATES,
};
