//! FFmpeg-based encoder for packaged codecs (AAC, Opus, AMR-WB)

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Duration as TokioDuration};
use tracing::{debug, info, warn};

use crate::application::ports::{AudioEncoder, EncoderConfig, EncoderHealth, RecordingError};
use crate::domain::recording::OutputFormat;

/// Default encoder binary
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Failure code for an encoder stream that ended without an exit code of its own
const STREAM_FAILURE_CODE: i32 = -2;

/// AMR-WB only encodes 16 kHz mono at up to 23.85 kbit/s
const AMR_WB_SAMPLE_RATE: u32 = 16_000;
const AMR_WB_BIT_RATE: u32 = 23_850;

/// Sample rates libopus accepts
const OPUS_SAMPLE_RATES: [u32; 5] = [8_000, 12_000, 16_000, 24_000, 48_000];
const OPUS_MIN_BIT_RATE: u32 = 500;
const OPUS_MAX_BIT_RATE_PER_CHANNEL: u32 = 256_000;

const AAC_MAX_BIT_RATE: u32 = 320_000;

/// Grace period for ffmpeg to write its trailer after SIGINT
const FINALIZE_TIMEOUT: TokioDuration = TokioDuration::from_secs(5);

/// Encoder that drives an `ffmpeg` child process
pub struct FfmpegEncoder {
    config: EncoderConfig,
    binary: String,
    child: Option<Child>,
    paused: bool,
}

impl FfmpegEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self::with_binary(config, FFMPEG_BINARY)
    }

    /// Use a specific ffmpeg executable
    pub fn with_binary(config: EncoderConfig, binary: impl Into<String>) -> Self {
        Self {
            config,
            binary: binary.into(),
            child: None,
            paused: false,
        }
    }

    /// Build FFmpeg args for recording
    fn build_ffmpeg_args(config: &EncoderConfig) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];
        args.extend(input_args(config.device.as_deref()));

        let (sample_rate, channels, bit_rate) = codec_params(config);
        args.extend([
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            channels.to_string(),
            "-c:a".to_string(),
            codec_name(config.format).to_string(),
            "-b:a".to_string(),
            bit_rate.to_string(),
        ]);

        if let Some(max_bytes) = config.max_bytes {
            args.push("-fs".to_string());
            args.push(max_bytes.to_string());
        }
        if let Some(location) = config.location {
            args.push("-metadata".to_string());
            args.push(format!("location={}", location.iso6709()));
        }

        args.push("-y".to_string());
        args.push(config.output.to_string_lossy().to_string());
        args
    }

    /// Send signal to FFmpeg process
    #[cfg(unix)]
    fn send_signal(child: &Child, sig: nix::sys::signal::Signal) -> Result<(), RecordingError> {
        use nix::sys::signal;
        use nix::unistd::Pid;

        if let Some(id) = child.id() {
            let pid = i32::try_from(id)
                .map_err(|_| RecordingError::StreamFailed(format!("Invalid pid {}", id)))?;
            signal::kill(Pid::from_raw(pid), sig)
                .map_err(|e| RecordingError::StreamFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    fn running_child(&self) -> Result<&Child, RecordingError> {
        self.child
            .as_ref()
            .ok_or_else(|| RecordingError::StreamFailed("Encoder is not running".to_string()))
    }

    async fn last_stderr_line(child: &mut Child) -> String {
        let mut buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf)
            .lines()
            .last()
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[async_trait]
impl AudioEncoder for FfmpegEncoder {
    async fn start(&mut self) -> Result<(), RecordingError> {
        if self.child.is_some() {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }
        if let Some(parent) = self.config.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = Self::build_ffmpeg_args(&self.config);
        debug!(binary = %self.binary, ?args, "spawning encoder");
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecordingError::EncoderNotFound(self.binary.clone())
                } else {
                    RecordingError::StartFailed(e.to_string())
                }
            })?;

        // Give ffmpeg a moment to open the device
        sleep(TokioDuration::from_millis(50)).await;
        if let Ok(Some(status)) = child.try_wait() {
            let reason = Self::last_stderr_line(&mut child).await;
            return Err(RecordingError::StartFailed(format!(
                "ffmpeg exited ({}): {}",
                status, reason
            )));
        }

        self.child = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    async fn pause(&mut self) -> Result<(), RecordingError> {
        Self::send_signal(self.running_child()?, nix::sys::signal::Signal::SIGSTOP)?;
        self.paused = true;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn pause(&mut self) -> Result<(), RecordingError> {
        self.running_child()?;
        Err(RecordingError::UnsupportedConfig(
            "Pausing encoded recordings requires a Unix platform".to_string(),
        ))
    }

    #[cfg(unix)]
    async fn resume(&mut self) -> Result<(), RecordingError> {
        Self::send_signal(self.running_child()?, nix::sys::signal::Signal::SIGCONT)?;
        self.paused = false;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn resume(&mut self) -> Result<(), RecordingError> {
        self.running_child()?;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), RecordingError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if child.try_wait()?.is_none() {
            #[cfg(unix)]
            {
                use nix::sys::signal::Signal;
                if self.paused {
                    Self::send_signal(&child, Signal::SIGCONT)?;
                }
                // SIGINT makes ffmpeg write the container trailer
                Self::send_signal(&child, Signal::SIGINT)?;
            }
            #[cfg(not(unix))]
            {
                use tokio::io::AsyncWriteExt;
                if let Some(stdin) = child.stdin.as_mut() {
                    let _ = stdin.write_all(b"q").await;
                }
            }

            match timeout(FINALIZE_TIMEOUT, child.wait()).await {
                Ok(status) => {
                    let status = status?;
                    debug!(%status, "encoder exited");
                }
                Err(_) => {
                    warn!("ffmpeg did not exit in time, killing it");
                    child.kill().await?;
                }
            }
        }
        self.paused = false;

        let written = output_len(&self.config.output);
        if written == 0 {
            return Err(RecordingError::FinalizeFailed(format!(
                "{} is empty: {}",
                self.config.output.display(),
                Self::last_stderr_line(&mut child).await
            )));
        }
        info!(file = %self.config.output.display(), bytes = written, "recording written");
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        output_len(&self.config.output)
    }

    fn health(&mut self) -> EncoderHealth {
        let Some(child) = self.child.as_mut() else {
            return EncoderHealth::Running;
        };
        match child.try_wait() {
            Ok(None) => EncoderHealth::Running,
            Ok(Some(status)) => {
                let health = exit_health(status.code(), self.config.max_bytes.is_some());
                if health != EncoderHealth::LimitReached {
                    warn!(%status, "encoder exited unexpectedly");
                }
                health
            }
            Err(e) => {
                warn!("Failed to poll encoder: {}", e);
                EncoderHealth::Failed(STREAM_FAILURE_CODE)
            }
        }
    }
}

/// Health of an encoder whose process has exited on its own.
///
/// ffmpeg exits cleanly when `-fs` is hit. A clean exit without a size cap
/// means the input stream ended, which is a stream fault rather than code 0.
fn exit_health(code: Option<i32>, size_capped: bool) -> EncoderHealth {
    match code {
        Some(0) if size_capped => EncoderHealth::LimitReached,
        Some(code) if code != 0 => EncoderHealth::Failed(code),
        _ => EncoderHealth::Failed(STREAM_FAILURE_CODE),
    }
}

/// Sample rate, channel count and bitrate the codec will accept
fn codec_params(config: &EncoderConfig) -> (u32, u16, u32) {
    match config.format {
        OutputFormat::ThreeGp => (AMR_WB_SAMPLE_RATE, 1, AMR_WB_BIT_RATE),
        OutputFormat::Ogg => {
            let max = OPUS_MAX_BIT_RATE_PER_CHANNEL
                .saturating_mul(u32::from(config.channels.max(1)));
            (
                nearest_opus_rate(config.sample_rate),
                config.channels,
                config.bit_rate().clamp(OPUS_MIN_BIT_RATE, max),
            )
        }
        OutputFormat::M4a => (
            config.sample_rate,
            config.channels,
            config.bit_rate().min(AAC_MAX_BIT_RATE),
        ),
        OutputFormat::Wav => (config.sample_rate, config.channels, config.bit_rate()),
    }
}

/// Closest libopus rate; ties go to the higher rate
fn nearest_opus_rate(rate: u32) -> u32 {
    OPUS_SAMPLE_RATES
        .iter()
        .copied()
        .min_by_key(|&r| (r.abs_diff(rate), std::cmp::Reverse(r)))
        .unwrap_or(rate)
}

/// ffmpeg codec for a packaged output format
fn codec_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::M4a => "aac",
        OutputFormat::Ogg => "libopus",
        OutputFormat::ThreeGp => "libvo_amrwbenc",
        OutputFormat::Wav => "pcm_s16le",
    }
}

/// Capture input arguments for the platform's audio framework
#[cfg(target_os = "linux")]
fn input_args(device: Option<&str>) -> Vec<String> {
    vec![
        "-f".to_string(),
        "pulse".to_string(),
        "-i".to_string(),
        device.unwrap_or("default").to_string(),
    ]
}

#[cfg(target_os = "macos")]
fn input_args(device: Option<&str>) -> Vec<String> {
    vec![
        "-f".to_string(),
        "avfoundation".to_string(),
        "-i".to_string(),
        format!(":{}", device.unwrap_or("default")),
    ]
}

#[cfg(windows)]
fn input_args(device: Option<&str>) -> Vec<String> {
    vec![
        "-f".to_string(),
        "dshow".to_string(),
        "-i".to_string(),
        format!("audio={}", device.unwrap_or("default")),
    ]
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn input_args(device: Option<&str>) -> Vec<String> {
    vec![
        "-f".to_string(),
        "oss".to_string(),
        "-i".to_string(),
        device.unwrap_or("/dev/dsp").to_string(),
    ]
}

fn output_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
