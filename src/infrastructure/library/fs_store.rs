//! Filesystem recordings store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use tokio::fs;
use tracing::{debug, info, warn};

use super::DurationProbe;
use crate::application::ports::{RecordingStore, StoreError};
use crate::domain::library::{AudioMimeType, RecordingEntry};
use crate::domain::recording::OutputFormat;

/// Prefix of generated recording names
pub const DEFAULT_NAME_PREFIX: &str = "Recording_";

/// Recordings kept as plain files in one directory
pub struct FsRecordingStore {
    dir: PathBuf,
    probe: DurationProbe,
}

impl FsRecordingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_probe(dir, DurationProbe::new())
    }

    pub fn with_probe(dir: impl Into<PathBuf>, probe: DurationProbe) -> Self {
        Self {
            dir: dir.into(),
            probe,
        }
    }

    /// Build an entry for an existing file, or `None` for non-audio files
    async fn entry_for(&self, path: &Path) -> Result<Option<RecordingEntry>, StoreError> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let Some(mime) = AudioMimeType::from_extension(&extension) else {
            return Ok(None);
        };
        let metadata = fs::metadata(path).await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(RecordingEntry {
            path: path.to_path_buf(),
            name: name.to_string(),
            extension,
            mime,
            size_bytes: metadata.len(),
            modified: metadata.modified()?,
            duration: self.probe.probe(path).await,
        }))
    }

    /// Resolve a user-supplied name to a file inside the directory
    async fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        let direct = self.dir.join(name);
        if fs::metadata(&direct).await.is_ok_and(|m| m.is_file()) {
            return Ok(direct);
        }

        // Allow the stem alone when it is unambiguous
        let mut matches = Vec::new();
        if let Ok(mut entries) = fs::read_dir(&self.dir).await {
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(name);
                let is_audio = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(AudioMimeType::from_extension)
                    .is_some();
                if stem_matches && is_audio {
                    matches.push(path);
                }
            }
        }
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(StoreError::NotFound(name.to_string())),
            _ => Err(StoreError::InvalidName(format!(
                "{} matches several recordings; include the extension",
                name
            ))),
        }
    }
}

/// Reject empty names and anything that could escape the directory
fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed != name
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl RecordingStore for FsRecordingStore {
    fn dir(&self) -> &Path {
        &self.dir
    }

    async fn list(&self) -> Result<Vec<RecordingEntry>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "recordings directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut recordings = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match self.entry_for(&path).await {
                Ok(Some(recording)) => recordings.push(recording),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), "Skipping unreadable recording: {}", e),
            }
        }
        Ok(recordings)
    }

    async fn get(&self, name: &str) -> Result<RecordingEntry, StoreError> {
        let path = self.resolve(name).await?;
        self.entry_for(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn rename(&self, name: &str, new_stem: &str) -> Result<RecordingEntry, StoreError> {
        let source = self.resolve(name).await?;
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let suffix = format!(".{}", extension);
        let stem = new_stem.strip_suffix(&suffix).unwrap_or(new_stem);
        validate_name(stem)?;

        let target = self.dir.join(format!("{}{}", stem, suffix));
        if target == source {
            return self.get(name).await;
        }
        if fs::try_exists(&target).await? {
            return Err(StoreError::AlreadyExists(
                target.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            ));
        }
        fs::rename(&source, &target).await?;
        info!(from = %source.display(), to = %target.display(), "recording renamed");
        self.entry_for(&target)
            .await?
            .ok_or_else(|| StoreError::NotFound(stem.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.resolve(name).await?;
        fs::remove_file(&path).await?;
        info!(file = %path.display(), "recording deleted");
        Ok(())
    }

    async fn export(&self, name: &str, destination: &Path) -> Result<PathBuf, StoreError> {
        let source = self.resolve(name).await?;
        let target = if fs::metadata(destination).await.is_ok_and(|m| m.is_dir()) {
            match source.file_name() {
                Some(file_name) => destination.join(file_name),
                None => return Err(StoreError::InvalidName(name.to_string())),
            }
        } else {
            destination.to_path_buf()
        };
        if fs::try_exists(&target).await? {
            return Err(StoreError::AlreadyExists(target.display().to_string()));
        }
        let bytes = fs::copy(&source, &target).await?;
        info!(to = %target.display(), bytes, "recording exported");
        Ok(target)
    }

    fn next_default_name(&self, format: OutputFormat) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let base = format!("{}{}", DEFAULT_NAME_PREFIX, stamp);
        let ext = format.extension();
        let mut candidate = self.dir.join(format!("{}.{}", base, ext));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{}_{}.{}", base, counter, ext));
            counter += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cannot_escape_the_directory() {
        assert!(validate_name("take.ogg").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name(" padded").is_err());
    }

    #[test]
    fn default_names_are_timestamped_and_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordingStore::new(dir.path());

        let first = store.next_default_name(OutputFormat::Ogg);
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(DEFAULT_NAME_PREFIX));
        assert!(name.ends_with(".ogg"));
        // Recording_YYYY-MM-DD_HH-MM-SS.ogg
        assert_eq!(name.len(), DEFAULT_NAME_PREFIX.len() + 19 + 4);

        std::fs::write(&first, b"x").unwrap();
        let second = store.next_default_name(OutputFormat::Ogg);
        assert_ne!(first, second);
    }
}
