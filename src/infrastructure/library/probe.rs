//! Container duration probing

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::recording::Duration;

/// Default probe binary for non-WAV containers
pub const FFPROBE_BINARY: &str = "ffprobe";

/// Reads recording durations: WAV headers directly, other containers via ffprobe
#[derive(Debug, Clone)]
pub struct DurationProbe {
    ffprobe: String,
}

impl DurationProbe {
    pub fn new() -> Self {
        Self::with_ffprobe(FFPROBE_BINARY)
    }

    pub fn with_ffprobe(binary: impl Into<String>) -> Self {
        Self {
            ffprobe: binary.into(),
        }
    }

    /// Duration of the file, or `None` when it cannot be determined
    pub async fn probe(&self, path: &Path) -> Option<Duration> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav {
            let path: PathBuf = path.to_path_buf();
            return tokio::task::spawn_blocking(move || wav_duration(&path))
                .await
                .ok()
                .flatten();
        }
        self.ffprobe_duration(path).await
    }

    async fn ffprobe_duration(&self, path: &Path) -> Option<Duration> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| debug!(file = %path.display(), "ffprobe unavailable: {}", e))
            .ok()?;
        if !output.status.success() {
            debug!(file = %path.display(), status = %output.status, "ffprobe failed");
            return None;
        }
        parse_seconds(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for DurationProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration from a WAV header's frame count and sample rate
pub fn wav_duration(path: &Path) -> Option<Duration> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| debug!(file = %path.display(), "unreadable WAV: {}", e))
        .ok()?;
    let rate = u64::from(reader.spec().sample_rate);
    if rate == 0 {
        return None;
    }
    let frames = u64::from(reader.duration());
    Some(Duration::from_millis(frames * 1000 / rate))
}

/// Parse ffprobe's fractional seconds output
fn parse_seconds(text: &str) -> Option<Duration> {
    let secs: f64 = text.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_millis((secs * 1000.0).round() as u64))
}
