//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::device::QualityTier;
use crate::domain::library::SortKey;
use crate::domain::recording::{GeoLocation, OutputFormat};

/// SoundRecorder - record voice notes from an input device
#[derive(Parser, Debug)]
#[command(name = "sound-recorder")]
#[command(version)]
#[command(about = "Record audio to m4a, ogg, 3gp or wav with pause/resume and time or size limits")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record from an input device until stopped or a limit is reached
    Record(RecordArgs),
    /// List recordable input devices and their negotiated formats
    Devices {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// List recordings in the library
    List(ListArgs),
    /// Rename a recording (the extension is kept)
    Rename {
        /// Current file name or stem
        name: String,
        /// New name without extension
        new_name: String,
    },
    /// Delete one or more recordings
    Delete {
        /// File names or stems
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Copy a recording out of the library
    Export {
        /// File name or stem
        name: String,
        /// Destination directory or file path
        destination: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `record`
#[derive(Args, Debug, Default)]
pub struct RecordArgs {
    /// Output file; the extension selects the format
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (m4a, ogg, 3gp, wav)
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Quality tier (low, standard, high)
    #[arg(short = 'q', long, value_name = "TIER")]
    pub quality: Option<QualityTier>,

    /// Channel count
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u16).range(1..=2))]
    pub channels: Option<u16>,

    /// Input device name as printed by `devices`
    #[arg(short = 'd', long, value_name = "NAME")]
    pub device: Option<String>,

    /// Stop after this long (e.g., 30s, 2m, 4m30s; at most 5m)
    #[arg(short = 't', long, value_name = "TIME", conflicts_with = "max_size")]
    pub max_duration: Option<String>,

    /// Stop when the file reaches this many kilobytes (at most 20000)
    #[arg(short = 's', long, value_name = "KB")]
    pub max_size: Option<u64>,

    /// Record without a limit, ignoring the remembered one
    #[arg(long, conflicts_with_all = ["max_duration", "max_size"])]
    pub no_limit: bool,

    /// Geotag as "latitude,longitude" (m4a, ogg and 3gp only)
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    pub location: Option<GeoLocation>,
}

/// Options for `list`
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Sort key (name, date, duration, size, type); remembered
    #[arg(long, value_name = "KEY")]
    pub sort: Option<SortKey>,

    /// Reverse the sort order; remembered
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Keep names containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_format",
    "quality",
    "channels",
    "limit_mode",
    "limit_value",
    "input_device",
    "sort_mode",
    "sort_reverse",
    "theme",
    "language",
    "recordings_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
