//! Recordings store port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::library::RecordingEntry;
use crate::domain::recording::OutputFormat;

/// Recordings store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Recording not found: {0}")]
    NotFound(String),

    #[error("A recording named {0} already exists")]
    AlreadyExists(String),

    #[error("Invalid recording name: {0:?}")]
    InvalidName(String),

    #[error("Storage error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Port for the directory of finished recordings
#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// Directory holding the recordings
    fn dir(&self) -> &Path;

    /// All audio files, in directory order
    async fn list(&self) -> Result<Vec<RecordingEntry>, StoreError>;

    /// Look up a recording by file name (with or without extension)
    async fn get(&self, name: &str) -> Result<RecordingEntry, StoreError>;

    /// Rename a recording, keeping its extension
    async fn rename(&self, name: &str, new_stem: &str) -> Result<RecordingEntry, StoreError>;

    /// Delete a recording
    async fn delete(&self, name: &str) -> Result<(), StoreError>;

    /// Copy a recording to a file or into a directory; returns the written path
    async fn export(&self, name: &str, destination: &Path) -> Result<PathBuf, StoreError>;

    /// Fresh, unused path for a new recording in the given format
    fn next_default_name(&self, format: OutputFormat) -> PathBuf;
}
