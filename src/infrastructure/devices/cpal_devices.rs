//! Input device discovery through cpal

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::SampleFormat;
use tracing::debug;

use crate::application::ports::{DeviceError, DeviceProvider, RecordingError};
use crate::domain::device::{DeviceCapabilities, DeviceKind, PcmEncoding};

/// Standard rates probed against each supported range
const PROBE_SAMPLE_RATES: &[u32] = &[
    8_000, 11_025, 16_000, 22_050, 32_000, 44_100, 48_000, 88_200, 96_000, 176_400, 192_000,
];

/// One supported input configuration range, detached from cpal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRange {
    pub channels: u16,
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub sample_format: SampleFormat,
}

impl From<&cpal::SupportedStreamConfigRange> for ConfigRange {
    fn from(range: &cpal::SupportedStreamConfigRange) -> Self {
        Self {
            channels: range.channels(),
            min_sample_rate: range.min_sample_rate().0,
            max_sample_rate: range.max_sample_rate().0,
            sample_format: range.sample_format(),
        }
    }
}

/// Device provider backed by the default cpal host
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalDeviceProvider;

impl CpalDeviceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceProvider for CpalDeviceProvider {
    fn input_devices(&self) -> Result<Vec<DeviceCapabilities>, DeviceError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?;

        let mut found = Vec::new();
        for (index, device) in devices.enumerate() {
            let name = match device.name() {
                Ok(name) => name,
                Err(e) => {
                    debug!("Skipping unnamed input device: {}", e);
                    continue;
                }
            };
            let ranges: Vec<ConfigRange> = match device.supported_input_configs() {
                Ok(configs) => configs.map(|c| ConfigRange::from(&c)).collect(),
                Err(e) => {
                    debug!(device = %name, "No input configs: {}", e);
                    continue;
                }
            };
            let id = u32::try_from(index).unwrap_or(u32::MAX);
            found.push(capabilities_from_ranges(id, &name, &ranges));
        }
        debug!(count = found.len(), host = ?host.id(), "enumerated input devices");
        Ok(found)
    }

    fn default_device_name(&self) -> Option<String> {
        cpal::default_host()
            .default_input_device()
            .and_then(|d| d.name().ok())
    }
}

/// Summarize cpal config ranges as capability lists
pub fn capabilities_from_ranges(id: u32, name: &str, ranges: &[ConfigRange]) -> DeviceCapabilities {
    let mut channel_counts: Vec<u16> = ranges.iter().map(|r| r.channels).collect();
    channel_counts.sort_unstable();
    channel_counts.dedup();

    let sample_rates: Vec<u32> = PROBE_SAMPLE_RATES
        .iter()
        .copied()
        .filter(|rate| {
            ranges
                .iter()
                .any(|r| r.min_sample_rate <= *rate && *rate <= r.max_sample_rate)
        })
        .collect();

    let mut encodings: Vec<PcmEncoding> = Vec::new();
    for range in ranges {
        if let Some(encoding) = encoding_for(range.sample_format) {
            if !encodings.contains(&encoding) {
                encodings.push(encoding);
            }
        }
    }

    DeviceCapabilities {
        id,
        name: name.to_string(),
        address: String::new(),
        kind: kind_from_name(name),
        channel_counts,
        sample_rates,
        encodings,
    }
}

fn encoding_for(format: SampleFormat) -> Option<PcmEncoding> {
    match format {
        SampleFormat::I8 | SampleFormat::U8 => Some(PcmEncoding::Pcm8),
        SampleFormat::I16 | SampleFormat::U16 => Some(PcmEncoding::Pcm16),
        SampleFormat::I32 | SampleFormat::U32 => Some(PcmEncoding::Pcm32),
        SampleFormat::F32 | SampleFormat::F64 => Some(PcmEncoding::PcmFloat),
        _ => None,
    }
}

/// Best-effort device kind from the host's device name
fn kind_from_name(name: &str) -> DeviceKind {
    let lower = name.to_lowercase();
    if lower.contains("monitor") || lower.contains("loopback") {
        DeviceKind::RemoteSubmix
    } else if lower.contains("bluez") || lower.contains("bluetooth") {
        DeviceKind::Bluetooth
    } else if lower.contains("usb") {
        DeviceKind::Usb
    } else if lower.contains("line") {
        DeviceKind::LineIn
    } else if lower.contains("mic") || lower.contains("built-in") || lower.contains("internal") {
        DeviceKind::BuiltinMic
    } else {
        DeviceKind::Other
    }
}

/// Resolve an input device by exact name, or the host default for `None`
pub fn find_input_device(
    host: &cpal::Host,
    name: Option<&str>,
) -> Result<cpal::Device, RecordingError> {
    let Some(name) = name else {
        return host.default_input_device().ok_or(RecordingError::NoAudioDevice);
    };
    let mut devices = host
        .input_devices()
        .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
    devices
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| RecordingError::DeviceNotFound(name.to_string()))
}
