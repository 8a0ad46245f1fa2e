//! Audio MIME type value object

use std::fmt;

use serde::Serialize;

/// Audio container types recognised in the recordings directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AudioMimeType {
    Mp4,
    Ogg,
    ThreeGpp,
    Wav,
    Mpeg,
    Aac,
    Flac,
    Amr,
    Webm,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "audio/mp4",
            Self::Ogg => "audio/ogg",
            Self::ThreeGpp => "audio/3gpp",
            Self::Wav => "audio/wav",
            Self::Mpeg => "audio/mpeg",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Amr => "audio/amr",
            Self::Webm => "audio/webm",
        }
    }

    /// Map a file extension to an audio MIME type, `None` for non-audio files
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "m4a" | "mp4" => Some(Self::Mp4),
            "ogg" | "oga" | "opus" => Some(Self::Ogg),
            "3gp" | "3gpp" => Some(Self::ThreeGpp),
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mpeg),
            "aac" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            "amr" => Some(Self::Amr),
            "webm" | "weba" => Some(Self::Webm),
            _ => None,
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_as_str() {
        assert_eq!(AudioMimeType::Ogg.as_str(), "audio/ogg");
        assert_eq!(AudioMimeType::Wav.as_str(), "audio/wav");
        assert_eq!(AudioMimeType::ThreeGpp.as_str(), "audio/3gpp");
    }

    #[test]
    fn recorder_outputs_are_audio() {
        for ext in ["m4a", "ogg", "3gp", "wav"] {
            assert!(AudioMimeType::from_extension(ext).is_some(), "{ext}");
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(AudioMimeType::from_extension("WAV"), Some(AudioMimeType::Wav));
    }

    #[test]
    fn non_audio_is_none() {
        assert_eq!(AudioMimeType::from_extension("txt"), None);
        assert_eq!(AudioMimeType::from_extension("pcm"), None);
        assert_eq!(AudioMimeType::from_extension(""), None);
    }
}
