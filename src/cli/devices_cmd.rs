//! `devices` command: recordable inputs and their negotiated formats

use std::collections::BTreeMap;

use serde::Serialize;

use crate::application::ports::{DeviceError, DeviceProvider};
use crate::domain::device::{
    dedupe_devices, select_format, DeviceCapabilities, FormatSelection, QualityTier,
};

use super::presenter::Presenter;

#[derive(Debug, Serialize)]
struct DeviceView<'a> {
    #[serde(flatten)]
    caps: &'a DeviceCapabilities,
    display_name: String,
    default: bool,
    formats: BTreeMap<&'static str, FormatSelection>,
}

impl<'a> DeviceView<'a> {
    fn new(caps: &'a DeviceCapabilities, default_name: Option<&str>) -> Self {
        Self {
            caps,
            display_name: caps.display_name(),
            default: default_name == Some(caps.name.as_str()),
            formats: QualityTier::ALL
                .into_iter()
                .map(|tier| (tier.as_str(), select_format(caps, tier)))
                .collect(),
        }
    }
}

/// List recordable input devices, builtin microphone first
pub fn handle_devices(
    provider: &dyn DeviceProvider,
    json: bool,
    presenter: &Presenter,
) -> Result<(), DeviceError> {
    let devices = dedupe_devices(provider.input_devices()?);
    let default_name = provider.default_device_name();
    let views: Vec<DeviceView<'_>> = devices
        .iter()
        .map(|caps| DeviceView::new(caps, default_name.as_deref()))
        .collect();

    if json {
        match serde_json::to_string_pretty(&views) {
            Ok(out) => presenter.output(&out),
            Err(e) => presenter.error(&format!("Failed to encode device list: {}", e)),
        }
        return Ok(());
    }

    if views.is_empty() {
        presenter.warn("No recordable input devices found");
        return Ok(());
    }

    for view in &views {
        let marker = if view.default { " (default)" } else { "" };
        presenter.heading(&format!("{}{}", view.display_name, marker));
        for line in describe(view.caps) {
            presenter.output(&format!("  {}", line));
        }
        for (tier, selection) in &view.formats {
            presenter.key_value(&format!("  {}", tier), &selection.to_string());
        }
    }
    Ok(())
}

/// Human-readable capability lines
fn describe(caps: &DeviceCapabilities) -> Vec<String> {
    fn list<T: ToString>(values: &[T]) -> String {
        if values.is_empty() {
            "any".to_string()
        } else {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    let encodings: Vec<String> = caps.encodings.iter().map(|e| format!("{:?}", e)).collect();
    vec![
        format!("kind: {:?}", caps.kind),
        format!("channels: {}", list(&caps.channel_counts)),
        format!("sample rates: {}", list(&caps.sample_rates)),
        format!("encodings: {}", list(&encodings)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceKind;

    fn usb() -> DeviceCapabilities {
        DeviceCapabilities {
            id: 3,
            name: "USB Mic".to_string(),
            kind: DeviceKind::Usb,
            channel_counts: vec![1, 2],
            sample_rates: vec![16_000, 48_000],
            ..Default::default()
        }
    }

    #[test]
    fn view_marks_default_and_negotiates_every_tier() {
        let caps = usb();
        let view = DeviceView::new(&caps, Some("USB Mic"));
        assert!(view.default);
        assert_eq!(view.formats.len(), 3);
        assert_eq!(view.formats["high"].sample_rate, 48_000);
        assert_eq!(view.formats["low"].sample_rate, 16_000);
    }

    #[test]
    fn json_flattens_capabilities() {
        let caps = usb();
        let json = serde_json::to_value(DeviceView::new(&caps, None)).unwrap();
        assert_eq!(json["name"], "USB Mic");
        assert_eq!(json["kind"], "usb");
        assert_eq!(json["default"], false);
        assert_eq!(json["formats"]["standard"]["bits_per_sample"], 16);
    }

    #[test]
    fn unconstrained_dimensions_read_as_any() {
        let lines = describe(&DeviceCapabilities::default());
        assert!(lines.contains(&"channels: any".to_string()));
        assert!(lines.contains(&"sample rates: any".to_string()));
    }
}
