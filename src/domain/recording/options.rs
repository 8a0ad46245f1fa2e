//! Recording options value objects

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::error::OptionsError;
use crate::domain::library::AudioMimeType;

use super::Duration;

/// Largest accepted time limit, in seconds
pub const MAX_TIME_LIMIT_SECS: u64 = 300;

/// Largest accepted size limit, in kilobytes
pub const MAX_SIZE_LIMIT_KB: u64 = 20_000;

/// Bytes per kilobyte for size limits (decimal, as file managers show it)
pub const BYTES_PER_KB: u64 = 1000;

/// Output container/codec pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// MPEG-4 audio with AAC
    M4a,
    /// Ogg with Opus
    #[default]
    Ogg,
    /// 3GPP with AMR-WB (legacy)
    ThreeGp,
    /// RIFF/WAVE with raw linear PCM
    Wav,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::M4a, Self::Ogg, Self::ThreeGp, Self::Wav];

    /// File extension without the dot
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::ThreeGp => "3gp",
            Self::Wav => "wav",
        }
    }

    pub const fn mime(&self) -> AudioMimeType {
        match self {
            Self::M4a => AudioMimeType::Mp4,
            Self::Ogg => AudioMimeType::Ogg,
            Self::ThreeGp => AudioMimeType::ThreeGpp,
            Self::Wav => AudioMimeType::Wav,
        }
    }

    /// Human-readable codec name
    pub const fn codec(&self) -> &'static str {
        match self {
            Self::M4a => "AAC",
            Self::Ogg => "Opus",
            Self::ThreeGp => "AMR",
            Self::Wav => "PCM",
        }
    }

    /// Whether this format bypasses packaged encoders
    pub const fn is_lossless(&self) -> bool {
        matches!(self, Self::Wav)
    }

    /// Derive the format from a file path's extension
    pub fn from_path(path: &Path) -> Result<Self, OptionsError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| OptionsError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "m4a" | "aac" => Ok(Self::M4a),
            "ogg" | "opus" => Ok(Self::Ogg),
            "3gp" | "amr" => Ok(Self::ThreeGp),
            "wav" | "raw" => Ok(Self::Wav),
            _ => Err(OptionsError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Whether a recording cap is expressed in elapsed time or output size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LimitMode {
    #[default]
    Size,
    Time,
}

impl LimitMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Time => "time",
        }
    }

    /// Upper bound for values in this mode
    pub const fn max_value(&self) -> u64 {
        match self {
            Self::Size => MAX_SIZE_LIMIT_KB,
            Self::Time => MAX_TIME_LIMIT_SECS,
        }
    }
}

impl FromStr for LimitMode {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "size" => Ok(Self::Size),
            "time" => Ok(Self::Time),
            _ => Err(OptionsError::InvalidLimitMode(s.to_string())),
        }
    }
}

impl fmt::Display for LimitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recording ceiling: seconds for [`LimitMode::Time`], kilobytes for [`LimitMode::Size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLimit {
    mode: LimitMode,
    value: u64,
}

impl RecordLimit {
    pub fn new(mode: LimitMode, value: u64) -> Result<Self, OptionsError> {
        if value == 0 || value > mode.max_value() {
            return Err(OptionsError::InvalidLimit {
                mode: mode.to_string(),
                value,
                max: mode.max_value(),
            });
        }
        Ok(Self { mode, value })
    }

    /// Time limit from a duration, rounded down to whole seconds
    pub fn time(duration: Duration) -> Result<Self, OptionsError> {
        Self::new(LimitMode::Time, duration.as_secs())
    }

    /// Size limit in kilobytes
    pub fn size_kb(kb: u64) -> Result<Self, OptionsError> {
        Self::new(LimitMode::Size, kb)
    }

    pub fn mode(&self) -> LimitMode {
        self.mode
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// The time ceiling, if this is a time limit
    pub fn max_duration(&self) -> Option<Duration> {
        match self.mode {
            LimitMode::Time => Some(Duration::from_secs(self.value)),
            LimitMode::Size => None,
        }
    }

    /// The size ceiling in bytes, if this is a size limit
    pub fn max_bytes(&self) -> Option<u64> {
        match self.mode {
            LimitMode::Size => Some(self.value * BYTES_PER_KB),
            LimitMode::Time => None,
        }
    }
}

impl fmt::Display for RecordLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            LimitMode::Time => write!(f, "{}", Duration::from_secs(self.value).clock()),
            LimitMode::Size if self.value >= 1000 => write!(
                f,
                "{}.{}MB",
                self.value / 1000,
                (self.value % 1000) / 100
            ),
            LimitMode::Size => write!(f, "{}kB", self.value),
        }
    }
}

/// Geolocation embedded as container metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, OptionsError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(OptionsError::InvalidLocation { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// ISO 6709 short form, e.g. `+37.7749-122.4194/`
    pub fn iso6709(&self) -> String {
        format!("{:+08.4}{:+09.4}/", self.latitude, self.longitude)
    }
}

impl FromStr for GeoLocation {
    type Err = OptionsError;

    /// Parse `lat,lon`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OptionsError::InvalidLocation {
            latitude: f64::NAN,
            longitude: f64::NAN,
        };
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        Self::new(lat, lon)
    }
}

/// Immutable description of one recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOptions {
    file: PathBuf,
    format: OutputFormat,
    device: Option<String>,
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
    limit: Option<RecordLimit>,
    location: Option<GeoLocation>,
}

impl RecordOptions {
    pub fn builder(file: impl Into<PathBuf>) -> RecordOptionsBuilder {
        RecordOptionsBuilder::new(file)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Input device name; `None` selects the system default
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn limit(&self) -> Option<RecordLimit> {
        self.limit
    }

    pub fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    /// Target encoder bitrate in bits per second
    pub fn bit_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(u32::from(self.bits_per_sample))
    }
}

/// Validating builder for [`RecordOptions`]
#[derive(Debug, Clone)]
pub struct RecordOptionsBuilder {
    file: PathBuf,
    device: Option<String>,
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
    limit: Option<RecordLimit>,
    location: Option<GeoLocation>,
}

impl RecordOptionsBuilder {
    fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            device: None,
            sample_rate: 44_100,
            bits_per_sample: 16,
            channels: 2,
            limit: None,
            location: None,
        }
    }

    pub fn device(mut self, device: Option<String>) -> Self {
        self.device = device;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = bits;
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn limit(mut self, limit: Option<RecordLimit>) -> Self {
        self.limit = limit;
        self
    }

    pub fn location(mut self, location: Option<GeoLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn build(self) -> Result<RecordOptions, OptionsError> {
        if self.file.file_name().is_none() {
            return Err(OptionsError::MissingFile);
        }
        let format = OutputFormat::from_path(&self.file)?;
        if !(1..=2).contains(&self.channels) {
            return Err(OptionsError::InvalidChannels(self.channels));
        }
        if self.sample_rate == 0 {
            return Err(OptionsError::InvalidSampleRate(self.sample_rate));
        }
        if !matches!(self.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(OptionsError::InvalidBitsPerSample(self.bits_per_sample));
        }

        Ok(RecordOptions {
            file: self.file,
            format,
            device: self.device,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            channels: self.channels,
            limit: self.limit,
            location: self.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trips_extension() {
        for format in OutputFormat::ALL {
            assert_eq!(format.extension().parse::<OutputFormat>().unwrap(), format);
        }
        assert!("mp3".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn only_wav_is_lossless() {
        assert!(OutputFormat::Wav.is_lossless());
        assert!(!OutputFormat::Ogg.is_lossless());
        assert!(!OutputFormat::M4a.is_lossless());
    }

    #[test]
    fn format_mime_types() {
        assert_eq!(OutputFormat::M4a.mime().as_str(), "audio/mp4");
        assert_eq!(OutputFormat::ThreeGp.mime().as_str(), "audio/3gpp");
    }

    #[test]
    fn limit_rejects_zero_and_out_of_range() {
        assert!(RecordLimit::new(LimitMode::Time, 0).is_err());
        assert!(RecordLimit::new(LimitMode::Time, 301).is_err());
        assert!(RecordLimit::new(LimitMode::Size, 20_001).is_err());
        assert!(RecordLimit::new(LimitMode::Size, 20_000).is_ok());
    }

    #[test]
    fn limit_ceilings_by_mode() {
        let time = RecordLimit::time(Duration::from_secs(90)).unwrap();
        assert_eq!(time.max_duration(), Some(Duration::from_secs(90)));
        assert_eq!(time.max_bytes(), None);

        let size = RecordLimit::size_kb(500).unwrap();
        assert_eq!(size.max_bytes(), Some(500_000));
        assert_eq!(size.max_duration(), None);
    }

    #[test]
    fn limit_display() {
        assert_eq!(RecordLimit::new(LimitMode::Time, 75).unwrap().to_string(), "01:15");
        assert_eq!(RecordLimit::new(LimitMode::Size, 700).unwrap().to_string(), "700kB");
        assert_eq!(RecordLimit::new(LimitMode::Size, 1500).unwrap().to_string(), "1.5MB");
    }

    #[test]
    fn location_parse_and_render() {
        let loc: GeoLocation = "37.7749, -122.4194".parse().unwrap();
        assert_eq!(loc.iso6709(), "+37.7749-122.4194/");
        assert!("91,0".parse::<GeoLocation>().is_err());
        assert!("nope".parse::<GeoLocation>().is_err());
    }

    #[test]
    fn builder_derives_format_from_extension() {
        let opts = RecordOptions::builder("/tmp/take.wav")
            .sample_rate(48_000)
            .bits_per_sample(24)
            .channels(1)
            .build()
            .unwrap();
        assert_eq!(opts.format(), OutputFormat::Wav);
        assert_eq!(opts.bit_rate(), 48_000 * 24);
        assert!(opts.device().is_none());
    }

    #[test]
    fn builder_validates_fields() {
        assert_eq!(
            RecordOptions::builder("/tmp/a.ogg").channels(3).build(),
            Err(OptionsError::InvalidChannels(3))
        );
        assert_eq!(
            RecordOptions::builder("/tmp/a.ogg").bits_per_sample(12).build(),
            Err(OptionsError::InvalidBitsPerSample(12))
        );
        assert!(RecordOptions::builder("/tmp/a.flac").build().is_err());
        assert!(RecordOptions::builder("/tmp/noext").build().is_err());
    }
}
