//! Main app runner for the `record` command

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::ports::{ConfigStore, DeviceProvider, RecordingStore};
use crate::application::RecordingService;
use crate::domain::config::AppConfig;
use crate::domain::device::{dedupe_devices, find_device, select_format, FormatSelection, QualityTier};
use crate::domain::recording::{
    Duration, OutputFormat, RecordLimit, RecordOptions, RecordingStatus,
};
use crate::infrastructure::PlatformEncoderFactory;

use super::args::RecordArgs;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Spinner refresh period
const TICK: std::time::Duration = std::time::Duration::from_millis(200);

/// Commands typed on stdin while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordControl {
    PauseResume,
    Stop,
    Erase,
}

impl RecordControl {
    /// `p` pauses or resumes, `s` or an empty line stops, `x` discards
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" | "resume" => Some(Self::PauseResume),
            "" | "s" | "stop" | "q" => Some(Self::Stop),
            "x" | "erase" | "discard" => Some(Self::Erase),
            _ => None,
        }
    }
}

/// How the recording loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Stopped,
    LimitReached,
    Erased,
    Failed(i32),
}

/// Load stored configuration layered over the defaults
pub async fn load_merged_config<S: ConfigStore>(store: &S) -> AppConfig {
    match store.load_merged().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable config file");
            AppConfig::defaults()
        }
    }
}

/// Limit requested on the command line, or the remembered one
pub fn resolve_limit(args: &RecordArgs, config: &AppConfig) -> Result<Option<RecordLimit>, String> {
    if args.no_limit {
        return Ok(None);
    }
    if let Some(ref text) = args.max_duration {
        let duration = text.parse::<Duration>().map_err(|e| e.to_string())?;
        return RecordLimit::time(duration)
            .map(Some)
            .map_err(|e| e.to_string());
    }
    if let Some(kb) = args.max_size {
        return RecordLimit::size_kb(kb).map(Some).map_err(|e| e.to_string());
    }
    Ok(config.limit())
}

/// Output path for a new recording.
///
/// An explicit path keeps a recognised extension; a bare path gets the
/// extension of `format`. Without a path the store picks a timestamped name.
pub fn resolve_output(
    output: Option<PathBuf>,
    format: OutputFormat,
    store: &dyn RecordingStore,
) -> PathBuf {
    match output {
        Some(path) if path.extension().is_none() => path.with_extension(format.extension()),
        Some(path) => path,
        None => store.next_default_name(format),
    }
}

/// Format to request from the chosen (or default) device
pub fn negotiate_format(
    provider: &dyn DeviceProvider,
    requested: Option<&str>,
    tier: QualityTier,
) -> FormatSelection {
    let devices = match provider.input_devices() {
        Ok(devices) => dedupe_devices(devices),
        Err(e) => {
            warn!(error = %e, "device enumeration failed, using unconstrained capabilities");
            Vec::new()
        }
    };

    let caps = match requested {
        Some(name) => find_device(&devices, name).cloned(),
        None => provider
            .default_device_name()
            .and_then(|name| find_device(&devices, &name).cloned())
            .or_else(|| devices.first().cloned()),
    }
    .unwrap_or_default();

    let selection = select_format(&caps, tier);
    debug!(device = %caps, tier = %tier, %selection, "negotiated capture format");
    selection
}

/// Run the `record` command
pub async fn run_record<S: ConfigStore>(
    args: RecordArgs,
    config_store: &S,
    store: &dyn RecordingStore,
    provider: &dyn DeviceProvider,
) -> ExitCode {
    let mut presenter = Presenter::new();
    let config = load_merged_config(config_store).await;

    let limit = match resolve_limit(&args, &config) {
        Ok(limit) => limit,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let requested_format = args.format.unwrap_or_else(|| config.output_format_or_default());
    let file = resolve_output(args.output, requested_format, store);
    if let (Some(explicit), Ok(actual)) = (args.format, OutputFormat::from_path(&file)) {
        if explicit != actual {
            presenter.warn(&format!(
                "Output extension selects {}, ignoring --format {}",
                actual, explicit
            ));
        }
    }

    let quality = args.quality.unwrap_or_else(|| config.quality_or_default());
    let channels = args.channels.unwrap_or_else(|| config.channels_or_default());
    let device = args.device.or_else(|| config.input_device.clone());
    let selection = negotiate_format(provider, device.as_deref(), quality);

    let options = match RecordOptions::builder(&file)
        .device(device.clone())
        .sample_rate(selection.sample_rate)
        .bits_per_sample(selection.bits_per_sample)
        .channels(channels)
        .limit(limit)
        .location(args.location)
        .build()
    {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    if options.location().is_some() && options.format().is_lossless() {
        presenter.warn("Location is only embedded in m4a, ogg and 3gp files");
    }

    if let Err(e) = ensure_parent_dir(options.file()).await {
        presenter.error(&format!("Cannot create {}: {}", options.file().display(), e));
        return ExitCode::from(EXIT_ERROR);
    }

    let mut shutdown = match ShutdownSignal::install() {
        Ok(signal) => signal,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let service = RecordingService::new(Arc::new(PlatformEncoderFactory::new()));
    let (tx, mut events) = mpsc::unbounded_channel();
    service.add_listener(move |event| {
        let _ = tx.send(event);
    });

    if let Err(e) = service.start(options.clone()).await {
        presenter.error(&format!("Could not start recording: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    info!(file = %options.file().display(), format = %options.format(), "recording");

    let remembered = device.clone();
    let format = options.format();
    if let Err(e) = config_store
        .update(Box::new(move |c: &mut AppConfig| {
            c.remember_last_used(format, quality, channels, limit, remembered)
        }))
        .await
    {
        warn!(error = %e, "could not save last-used recording options");
    }

    presenter.info(&format!(
        "{} · {} · {}ch · {}",
        options.file().display(),
        options.format().codec(),
        options.channels(),
        selection
    ));
    presenter.start_spinner(&presenter.format_status_line(
        RecordingStatus::Started,
        Duration::ZERO,
        limit,
    ));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = tokio::time::interval(TICK);

    let outcome = loop {
        tokio::select! {
            Some(event) = events.recv() => match event.status {
                RecordingStatus::MaxReached => break Outcome::LimitReached,
                RecordingStatus::Failed => break Outcome::Failed(event.extra),
                RecordingStatus::Idle => break Outcome::Stopped,
                RecordingStatus::Started | RecordingStatus::Paused => {
                    let elapsed = service.duration().await;
                    presenter.update_recording_progress(event.status, elapsed, limit);
                }
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match RecordControl::parse(&line) {
                    Some(RecordControl::PauseResume) => {
                        if let Err(e) = service.pause_resume().await {
                            presenter.warn(&e.to_string());
                        }
                    }
                    Some(RecordControl::Stop) => break Outcome::Stopped,
                    Some(RecordControl::Erase) => break Outcome::Erased,
                    None => presenter.warn("Commands: p = pause/resume, s = stop, x = discard"),
                },
                Ok(None) | Err(_) => {
                    debug!("stdin closed, recording until a signal or limit");
                    stdin_open = false;
                }
            },
            Some(_) = shutdown.recv() => break Outcome::Stopped,
            _ = ticker.tick() => {
                let status = service.status().await;
                let elapsed = service.duration().await;
                presenter.update_recording_progress(status, elapsed, limit);
            }
        }
    };

    let elapsed = service.duration().await;
    match outcome {
        Outcome::Erased => {
            service.erase().await;
            presenter.spinner_fail("Recording discarded");
            ExitCode::from(EXIT_SUCCESS)
        }
        Outcome::Stopped | Outcome::LimitReached => {
            service.stop().await;
            let prefix = if outcome == Outcome::LimitReached {
                "Limit reached, saved"
            } else {
                "Saved"
            };
            presenter.spinner_success(&format!("{} {} ({})", prefix, file_label(&file), elapsed.clock()));
            presenter.output(&options.file().display().to_string());
            ExitCode::from(EXIT_SUCCESS)
        }
        Outcome::Failed(code) => {
            service.stop().await;
            presenter.spinner_fail(&format!("Recording failed (code {})", code));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn ensure_parent_dir(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

fn file_label(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}
