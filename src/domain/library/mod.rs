//! Recordings library: file metadata views, sorting and filtering

mod entry;
mod mime;

pub use entry::{filter_entries, sort_entries, RecordingEntry, SortKey};
pub use mime::AudioMimeType;
