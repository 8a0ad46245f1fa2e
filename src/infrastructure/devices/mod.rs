//! Input device enumeration adapters

mod cpal_devices;

pub use cpal_devices::{capabilities_from_ranges, find_input_device, CpalDeviceProvider, ConfigRange};
