//! PCM sample packing for the WAV path
//!
//! Capture callbacks deliver interleaved samples in the device's native
//! layout. [`PcmPacker`] maps them onto the requested channel count and
//! container width as little-endian bytes.

/// Converts interleaved float frames into packed PCM bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmPacker {
    source_channels: u16,
    target_channels: u16,
    bits_per_sample: u16,
}

impl PcmPacker {
    pub fn new(source_channels: u16, target_channels: u16, bits_per_sample: u16) -> Self {
        Self {
            source_channels: source_channels.max(1),
            target_channels: target_channels.max(1),
            bits_per_sample,
        }
    }

    /// Packed bytes per output frame
    pub fn frame_len(&self) -> usize {
        usize::from(self.target_channels) * usize::from(self.bits_per_sample / 8)
    }

    /// Append packed frames for `samples` to `out`. A trailing partial
    /// frame is dropped.
    pub fn pack(&self, samples: &[f32], out: &mut Vec<u8>) {
        let source = usize::from(self.source_channels);
        out.reserve(samples.len() / source * self.frame_len());
        for frame in samples.chunks_exact(source) {
            match (source, self.target_channels) {
                (1, 2) => {
                    self.push_sample(frame[0], out);
                    self.push_sample(frame[0], out);
                }
                (_, 1) => {
                    let mixed = frame.iter().sum::<f32>() / source as f32;
                    self.push_sample(mixed, out);
                }
                (_, target) => {
                    for &sample in frame.iter().take(usize::from(target)) {
                        self.push_sample(sample, out);
                    }
                }
            }
        }
    }

    fn push_sample(&self, sample: f32, out: &mut Vec<u8>) {
        let s = sample.clamp(-1.0, 1.0);
        match self.bits_per_sample {
            8 => out.push(((s * 127.0).round() as i16 + 128) as u8),
            16 => out.extend_from_slice(&((s * 32_767.0).round() as i16).to_le_bytes()),
            24 => {
                let v = (s * 8_388_607.0).round() as i32;
                out.extend_from_slice(&v.to_le_bytes()[..3]);
            }
            _ => {
                let v = (f64::from(s) * f64::from(i32::MAX)).round() as i32;
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_bit_mono_passthrough() {
        let packer = PcmPacker::new(1, 1, 16);
        let mut out = Vec::new();
        packer.pack(&[0.0, 1.0, -1.0], &mut out);
        assert_eq!(out, [0, 0, 0xff, 0x7f, 0x01, 0x80]);
    }

    #[test]
    fn eight_bit_is_unsigned() {
        let packer = PcmPacker::new(1, 1, 8);
        let mut out = Vec::new();
        packer.pack(&[0.0, 1.0, -1.0], &mut out);
        assert_eq!(out, [128, 255, 1]);
    }

    #[test]
    fn twenty_four_bit_is_three_bytes() {
        let packer = PcmPacker::new(1, 1, 24);
        let mut out = Vec::new();
        packer.pack(&[1.0, -1.0], &mut out);
        assert_eq!(out, [0xff, 0xff, 0x7f, 0x01, 0x00, 0x80]);
    }

    #[test]
    fn thirty_two_bit_full_scale() {
        let packer = PcmPacker::new(1, 1, 32);
        let mut out = Vec::new();
        packer.pack(&[1.0], &mut out);
        assert_eq!(out, i32::MAX.to_le_bytes());
    }

    #[test]
    fn stereo_downmix_averages() {
        let packer = PcmPacker::new(2, 1, 8);
        let mut out = Vec::new();
        packer.pack(&[1.0, -1.0, 0.5, 0.5], &mut out);
        assert_eq!(out, [128, 192]);
    }

    #[test]
    fn mono_upmix_duplicates() {
        let packer = PcmPacker::new(1, 2, 8);
        let mut out = Vec::new();
        packer.pack(&[1.0], &mut out);
        assert_eq!(out, [255, 255]);
    }

    #[test]
    fn extra_channels_are_dropped() {
        let packer = PcmPacker::new(4, 2, 8);
        let mut out = Vec::new();
        packer.pack(&[1.0, -1.0, 0.5, 0.5, 0.0, 0.0, 0.0, 0.0], &mut out);
        assert_eq!(out, [255, 1, 128, 128]);
    }

    #[test]
    fn out_of_range_samples_clamp() {
        let packer = PcmPacker::new(1, 1, 16);
        let mut out = Vec::new();
        packer.pack(&[3.0], &mut out);
        assert_eq!(out, 32_767i16.to_le_bytes());
    }

    #[test]
    fn partial_frame_is_dropped() {
        let packer = PcmPacker::new(2, 2, 16);
        let mut out = Vec::new();
        packer.pack(&[0.0, 0.0, 0.0], &mut out);
        assert_eq!(out.len(), packer.frame_len());
    }
}
