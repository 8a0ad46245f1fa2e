//! Input device capability records and de-duplication

use std::fmt;

use serde::Serialize;

/// Broad category of an input device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    BuiltinMic,
    Usb,
    Bluetooth,
    LineIn,
    RemoteSubmix,
    Telephony,
    FmTuner,
    #[default]
    Other,
}

impl DeviceKind {
    /// Whether the device can be offered as a recording source
    pub const fn is_recordable(&self) -> bool {
        !matches!(self, Self::RemoteSubmix | Self::Telephony | Self::FmTuner)
    }
}

/// PCM encodings a device reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PcmEncoding {
    Pcm8,
    Pcm16,
    Pcm24,
    PcmFloat,
    Pcm32,
}

/// Capabilities of one input device.
///
/// Empty `channel_counts`, `sample_rates` or `encodings` mean the device
/// accepts any value for that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeviceCapabilities {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub kind: DeviceKind,
    pub channel_counts: Vec<u16>,
    pub sample_rates: Vec<u32>,
    pub encodings: Vec<PcmEncoding>,
}

impl DeviceCapabilities {
    /// Name and address concatenated; duplicates share this key
    pub fn identity(&self) -> String {
        format!("{}{}", self.name, self.address)
    }

    /// `name (address)` when an address exists, otherwise the name
    pub fn display_name(&self) -> String {
        if self.address.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.address)
        }
    }

    /// Largest channel count; unbounded when the list is empty
    pub fn max_channels(&self) -> u32 {
        max_or_unbounded(self.channel_counts.iter().map(|&c| u32::from(c)))
    }

    /// Largest sample rate; unbounded when the list is empty
    pub fn max_sample_rate(&self) -> u32 {
        max_or_unbounded(self.sample_rates.iter().copied())
    }

    /// Whether `other` should replace `self` as the surviving duplicate
    fn is_outranked_by(&self, other: &Self) -> bool {
        (other.max_channels(), other.max_sample_rate())
            > (self.max_channels(), self.max_sample_rate())
    }
}

impl fmt::Display for DeviceCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn max_or_unbounded(values: impl Iterator<Item = u32>) -> u32 {
    let mut seen = false;
    let mut max = 1;
    for v in values {
        seen = true;
        max = max.max(v);
    }
    if seen {
        max
    } else {
        u32::MAX
    }
}

/// Filter and collapse a raw device list.
///
/// Non-recordable kinds are dropped. Entries sharing `name+address` collapse
/// to the one with more channels (tie-break: higher sample rate; full ties
/// keep the first seen). The first builtin microphone is moved to the front
/// and entries without a display name are dropped.
pub fn dedupe_devices(devices: Vec<DeviceCapabilities>) -> Vec<DeviceCapabilities> {
    let mut unique: Vec<DeviceCapabilities> = Vec::with_capacity(devices.len());

    for device in devices {
        if !device.kind.is_recordable() {
            continue;
        }
        match unique.iter_mut().find(|d| d.identity() == device.identity()) {
            Some(existing) if existing.is_outranked_by(&device) => *existing = device,
            Some(_) => {}
            None => unique.push(device),
        }
    }

    if let Some(pos) = unique.iter().position(|d| d.kind == DeviceKind::BuiltinMic) {
        let builtin = unique.remove(pos);
        unique.insert(0, builtin);
    }

    unique.retain(|d| !d.display_name().is_empty());
    unique
}

/// Find a device by display name or raw name
pub fn find_device<'a>(
    devices: &'a [DeviceCapabilities],
    name: &str,
) -> Option<&'a DeviceCapabilities> {
    devices
        .iter()
        .find(|d| d.display_name() == name)
        .or_else(|| devices.iter().find(|d| d.name == name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, address: &str, channels: &[u16], rates: &[u32]) -> DeviceCapabilities {
        DeviceCapabilities {
            name: name.to_string(),
            address: address.to_string(),
            channel_counts: channels.to_vec(),
            sample_rates: rates.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_lists_are_unbounded() {
        let d = device("mic", "", &[], &[]);
        assert_eq!(d.max_channels(), u32::MAX);
        assert_eq!(d.max_sample_rate(), u32::MAX);
    }

    #[test]
    fn duplicates_keep_more_channels() {
        let mono = DeviceCapabilities { id: 1, ..device("USB", "card1", &[1], &[48_000]) };
        let stereo = DeviceCapabilities { id: 2, ..device("USB", "card1", &[1, 2], &[44_100]) };

        let result = dedupe_devices(vec![mono, stereo]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn channel_tie_breaks_on_sample_rate() {
        let low = DeviceCapabilities { id: 1, ..device("USB", "card1", &[2], &[44_100]) };
        let high = DeviceCapabilities { id: 2, ..device("USB", "card1", &[2], &[96_000]) };

        let result = dedupe_devices(vec![low, high]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn fewer_channels_never_wins_on_rate() {
        let stereo = DeviceCapabilities { id: 1, ..device("USB", "card1", &[2], &[44_100]) };
        let mono_fast = DeviceCapabilities { id: 2, ..device("USB", "card1", &[1], &[192_000]) };

        let result = dedupe_devices(vec![stereo, mono_fast]);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn full_tie_keeps_first() {
        let a = DeviceCapabilities { id: 1, ..device("USB", "card1", &[2], &[48_000]) };
        let b = DeviceCapabilities { id: 2, ..device("USB", "card1", &[2], &[48_000]) };
        assert_eq!(dedupe_devices(vec![a, b])[0].id, 1);
    }

    #[test]
    fn different_addresses_stay_separate() {
        let a = device("USB", "card1", &[2], &[48_000]);
        let b = device("USB", "card2", &[2], &[48_000]);
        assert_eq!(dedupe_devices(vec![a, b]).len(), 2);
    }

    #[test]
    fn unrecordable_kinds_are_dropped() {
        let tel = DeviceCapabilities { kind: DeviceKind::Telephony, ..device("tel", "", &[1], &[8000]) };
        let fm = DeviceCapabilities { kind: DeviceKind::FmTuner, ..device("fm", "", &[1], &[8000]) };
        let mic = device("mic", "", &[1], &[8000]);
        let result = dedupe_devices(vec![tel, fm, mic]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "mic");
    }

    #[test]
    fn builtin_mic_moves_to_front() {
        let usb = DeviceCapabilities { kind: DeviceKind::Usb, ..device("usb", "", &[2], &[48_000]) };
        let builtin = DeviceCapabilities {
            kind: DeviceKind::BuiltinMic,
            ..device("builtin", "", &[1], &[48_000])
        };
        let result = dedupe_devices(vec![usb, builtin]);
        assert_eq!(result[0].name, "builtin");
    }

    #[test]
    fn nameless_devices_are_dropped() {
        let result = dedupe_devices(vec![device("", "", &[1], &[8000])]);
        assert!(result.is_empty());
    }

    #[test]
    fn display_name_includes_address() {
        assert_eq!(device("USB", "card1", &[], &[]).display_name(), "USB (card1)");
        assert_eq!(device("USB", "", &[], &[]).display_name(), "USB");
    }

    #[test]
    fn find_by_display_or_raw_name() {
        let devices = vec![device("USB", "card1", &[], &[]), device("mic", "", &[], &[])];
        assert_eq!(find_device(&devices, "USB (card1)").unwrap().name, "USB");
        assert_eq!(find_device(&devices, "USB").unwrap().address, "card1");
        assert!(find_device(&devices, "nope").is_none());
    }
}
