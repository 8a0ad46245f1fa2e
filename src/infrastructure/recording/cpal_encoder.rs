//! Raw PCM capture encoder using cpal
//!
//! The cpal stream is not `Send`, so a dedicated capture thread owns it.
//! Packed PCM is spooled to `<output>.pcm` while recording; finalize
//! prepends the WAV header and writes the target file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::pcm::PcmPacker;
use super::wav::{write_wav, WavFormat};
use crate::application::ports::{AudioEncoder, EncoderConfig, EncoderHealth, RecordingError};
use crate::infrastructure::devices::find_input_device;

/// Failure code for faults raised by the capture stream
const STREAM_FAILURE_CODE: i32 = -2;

/// How often the capture thread checks for stop requests
const RECV_TIMEOUT: StdDuration = StdDuration::from_millis(100);

/// Flags shared between the encoder, the capture thread and the stream callback
#[derive(Default)]
struct CaptureShared {
    paused: AtomicBool,
    stop: AtomicBool,
    discard: AtomicBool,
    limit_reached: AtomicBool,
    failed: AtomicBool,
    bytes: AtomicU64,
}

/// WAV encoder fed by a cpal input stream
pub struct CpalEncoder {
    config: EncoderConfig,
    format: WavFormat,
    spool: PathBuf,
    shared: Arc<CaptureShared>,
    worker: Option<JoinHandle<Result<u64, RecordingError>>>,
}

impl CpalEncoder {
    /// Validate the configuration. Nothing touches the device until `start`.
    pub fn new(config: EncoderConfig) -> Result<Self, RecordingError> {
        let format = WavFormat::new(config.sample_rate, config.channels, config.bits_per_sample)
            .map_err(|e| RecordingError::UnsupportedConfig(e.to_string()))?;
        Ok(Self {
            spool: spool_path(&config.output),
            config,
            format,
            shared: Arc::new(CaptureShared::default()),
            worker: None,
        })
    }

    /// Payload ceiling for this recording, on a frame boundary
    fn payload_cap(&self) -> u64 {
        self.format
            .aligned_cap(self.config.max_bytes.unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl AudioEncoder for CpalEncoder {
    async fn start(&mut self) -> Result<(), RecordingError> {
        if self.worker.is_some() {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let job = CaptureJob {
            config: self.config.clone(),
            spool: self.spool.clone(),
            cap: self.payload_cap(),
            shared: Arc::clone(&self.shared),
        };
        let handle = std::thread::Builder::new()
            .name("wav-capture".to_string())
            .spawn(move || job.run(ready_tx))
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
        self.worker = Some(handle);

        match ready_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.worker = None;
                Err(e)
            }
            Err(_) => {
                self.worker = None;
                Err(RecordingError::StartFailed(
                    "Capture thread exited before the stream opened".to_string(),
                ))
            }
        }
    }

    async fn pause(&mut self) -> Result<(), RecordingError> {
        self.shared.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), RecordingError> {
        self.shared.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), RecordingError> {
        self.shared.stop.store(true, Ordering::SeqCst);
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let joined = tokio::task::spawn_blocking(move || worker.join())
            .await
            .map_err(|e| RecordingError::FinalizeFailed(e.to_string()))?;
        let payload_len = match joined {
            Ok(Ok(len)) => len,
            Ok(Err(e)) => {
                let _ = fs::remove_file(&self.spool);
                return Err(e);
            }
            Err(_) => {
                let _ = fs::remove_file(&self.spool);
                return Err(RecordingError::FinalizeFailed(
                    "Capture thread panicked".to_string(),
                ));
            }
        };

        let spool = self.spool.clone();
        let output = self.config.output.clone();
        let format = self.format;
        tokio::task::spawn_blocking(move || assemble_wav(&spool, &output, payload_len, &format))
            .await
            .map_err(|e| RecordingError::FinalizeFailed(e.to_string()))??;

        info!(
            file = %self.config.output.display(),
            bytes = payload_len,
            "WAV recording written"
        );
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.shared.bytes.load(Ordering::SeqCst)
    }

    fn health(&mut self) -> EncoderHealth {
        if self.shared.failed.load(Ordering::SeqCst) {
            return EncoderHealth::Failed(STREAM_FAILURE_CODE);
        }
        if self.shared.limit_reached.load(Ordering::SeqCst) {
            return EncoderHealth::LimitReached;
        }
        let exited = self
            .worker
            .as_ref()
            .is_some_and(|w| w.is_finished() && !self.shared.stop.load(Ordering::SeqCst));
        if exited {
            return EncoderHealth::Failed(STREAM_FAILURE_CODE);
        }
        EncoderHealth::Running
    }
}

impl Drop for CpalEncoder {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shared.discard.store(true, Ordering::SeqCst);
            self.shared.stop.store(true, Ordering::SeqCst);
        }
    }
}

/// Everything the capture thread owns
struct CaptureJob {
    config: EncoderConfig,
    spool: PathBuf,
    cap: u64,
    shared: Arc<CaptureShared>,
}

impl CaptureJob {
    fn run(self, ready: oneshot::Sender<Result<(), RecordingError>>) -> Result<u64, RecordingError> {
        let (stream, chunks, file) = match self.open() {
            Ok(opened) => opened,
            Err(e) => {
                let _ = ready.send(Err(e.clone()));
                return Err(e);
            }
        };
        if let Err(e) = stream.play() {
            let e = RecordingError::StartFailed(e.to_string());
            let _ = fs::remove_file(&self.spool);
            let _ = ready.send(Err(e.clone()));
            return Err(e);
        }
        let _ = ready.send(Ok(()));
        debug!(cap = self.cap, "capture stream running");

        let mut writer = BufWriter::new(file);
        let mut written = 0u64;
        while !self.shared.stop.load(Ordering::SeqCst) {
            match chunks.recv_timeout(RECV_TIMEOUT) {
                Ok(chunk) => written = self.spool_chunk(&mut writer, &chunk, written),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        drop(stream);
        while let Ok(chunk) = chunks.try_recv() {
            written = self.spool_chunk(&mut writer, &chunk, written);
        }

        let flushed = writer.flush();
        if self.shared.discard.load(Ordering::SeqCst) {
            let _ = fs::remove_file(&self.spool);
            return Ok(0);
        }
        flushed?;
        Ok(written)
    }

    fn open(&self) -> Result<(cpal::Stream, Receiver<Vec<u8>>, File), RecordingError> {
        let host = cpal::default_host();
        let device = find_input_device(&host, self.config.device.as_deref())?;
        let (stream_config, sample_format) =
            pick_stream_config(&device, self.config.sample_rate, self.config.channels)?;
        debug!(
            device_channels = stream_config.channels,
            ?sample_format,
            "opening capture stream"
        );

        let packer = PcmPacker::new(
            stream_config.channels,
            self.config.channels,
            self.config.bits_per_sample,
        );
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let stream = match sample_format {
            SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, packer, tx, shared),
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, packer, tx, shared),
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, packer, tx, shared),
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, packer, tx, shared),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, packer, tx, shared),
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, packer, tx, shared),
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, packer, tx, shared),
            other => Err(RecordingError::UnsupportedConfig(format!(
                "Unsupported sample format {:?}",
                other
            ))),
        }?;

        if let Some(parent) = self.spool.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.spool)?;
        Ok((stream, rx, file))
    }

    /// Append a chunk without crossing the cap; returns the new total
    fn spool_chunk(&self, writer: &mut BufWriter<File>, chunk: &[u8], written: u64) -> u64 {
        if self.shared.limit_reached.load(Ordering::SeqCst) || self.shared.failed.load(Ordering::SeqCst) {
            return written;
        }
        let room = self.cap.saturating_sub(written);
        let take = usize::try_from(room).map_or(chunk.len(), |room| chunk.len().min(room));
        if let Err(e) = writer.write_all(&chunk[..take]) {
            error!("Failed to spool audio: {}", e);
            self.shared.failed.store(true, Ordering::SeqCst);
            return written;
        }
        let total = written + take as u64;
        self.shared.bytes.store(total, Ordering::SeqCst);
        if total >= self.cap {
            info!(bytes = total, "WAV size cap reached");
            self.shared.limit_reached.store(true, Ordering::SeqCst);
        }
        total
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    packer: PcmPacker,
    tx: Sender<Vec<u8>>,
    shared: Arc<CaptureShared>,
) -> Result<cpal::Stream, RecordingError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let err_shared = Arc::clone(&shared);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if shared.paused.load(Ordering::Relaxed) || shared.stop.load(Ordering::Relaxed) {
                    return;
                }
                let samples: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
                let mut bytes = Vec::new();
                packer.pack(&samples, &mut bytes);
                let _ = tx.send(bytes);
            },
            move |err| {
                error!("Audio stream error: {}", err);
                err_shared.failed.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| RecordingError::StartFailed(e.to_string()))
}

/// Choose a device configuration that captures at exactly `sample_rate`
fn pick_stream_config(
    device: &cpal::Device,
    sample_rate: u32,
    channels: u16,
) -> Result<(StreamConfig, SampleFormat), RecordingError> {
    let ranges = device
        .supported_input_configs()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to get configs: {}", e)))?;

    let best = ranges
        .filter(|r| r.min_sample_rate().0 <= sample_rate && sample_rate <= r.max_sample_rate().0)
        .min_by_key(|r| (r.channels().abs_diff(channels), format_rank(r.sample_format())))
        .ok_or_else(|| {
            RecordingError::UnsupportedConfig(format!("Device cannot capture at {} Hz", sample_rate))
        })?;

    let supported = best.with_sample_rate(cpal::SampleRate(sample_rate));
    Ok((supported.config(), supported.sample_format()))
}

/// Preference order among native sample formats
fn format_rank(format: SampleFormat) -> u8 {
    match format {
        SampleFormat::F32 => 0,
        SampleFormat::I32 => 1,
        SampleFormat::I16 => 2,
        _ => 3,
    }
}

fn spool_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".pcm");
    PathBuf::from(name)
}

/// Write header + spooled PCM to `output`, then drop the spool
fn assemble_wav(
    spool: &Path,
    output: &Path,
    payload_len: u64,
    format: &WavFormat,
) -> Result<(), RecordingError> {
    let mut reader = BufReader::new(File::open(spool)?);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(output)?);
    write_wav(&mut writer, &mut reader, payload_len, format)
        .map_err(|e| RecordingError::FinalizeFailed(e.to_string()))?;
    if let Err(e) = fs::remove_file(spool) {
        warn!(spool = %spool.display(), "Failed to remove PCM spool: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::OutputFormat;

    fn config(output: PathBuf, max_bytes: Option<u64>) -> EncoderConfig {
        EncoderConfig {
            output,
            format: OutputFormat::Wav,
            device: None,
            sample_rate: 8_000,
            bits_per_sample: 16,
            channels: 2,
            max_bytes,
            location: None,
        }
    }

    #[test]
    fn spool_sits_next_to_output() {
        assert_eq!(
            spool_path(Path::new("/rec/take.wav")),
            PathBuf::from("/rec/take.wav.pcm")
        );
    }

    #[test]
    fn invalid_width_is_rejected_before_capture() {
        let mut cfg = config(PathBuf::from("x.wav"), None);
        cfg.bits_per_sample = 12;
        assert!(matches!(
            CpalEncoder::new(cfg),
            Err(RecordingError::UnsupportedConfig(_))
        ));
    }

    #[test]
    fn size_cap_is_frame_aligned() {
        let encoder = CpalEncoder::new(config(PathBuf::from("x.wav"), Some(1_001))).unwrap();
        assert_eq!(encoder.payload_cap(), 1_000);
    }

    #[test]
    fn unstarted_encoder_is_running_and_empty() {
        let mut encoder = CpalEncoder::new(config(PathBuf::from("x.wav"), None)).unwrap();
        assert_eq!(encoder.health(), EncoderHealth::Running);
        assert_eq!(encoder.bytes_written(), 0);
    }

    #[tokio::test]
    async fn finalize_without_start_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("never.wav");
        let mut encoder = CpalEncoder::new(config(output.clone(), None)).unwrap();
        encoder.finalize().await.unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn assemble_prepends_header_and_removes_spool() {
        let dir = tempfile::tempdir().unwrap();
        let spool = dir.path().join("take.wav.pcm");
        let output = dir.path().join("nested").join("take.wav");
        fs::write(&spool, [1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let format = WavFormat::new(8_000, 2, 16).unwrap();
        assemble_wav(&spool, &output, 8, &format).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[44..], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(!spool.exists());
    }

    #[test]
    fn float_formats_rank_first() {
        assert!(format_rank(SampleFormat::F32) < format_rank(SampleFormat::I16));
        assert!(format_rank(SampleFormat::I16) < format_rank(SampleFormat::U8));
    }
}
