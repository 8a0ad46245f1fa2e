//! Recordings directory adapters

mod fs_store;
mod probe;

pub use fs_store::{FsRecordingStore, DEFAULT_NAME_PREFIX};
pub use probe::{wav_duration, DurationProbe, FFPROBE_BINARY};
