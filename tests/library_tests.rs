//! Recordings library integration tests against a real directory

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use sound_recorder::application::ports::{RecordingStore, StoreError};
use sound_recorder::domain::library::{filter_entries, sort_entries, SortKey};
use sound_recorder::domain::recording::{Duration, OutputFormat};
use sound_recorder::infrastructure::{DurationProbe, FsRecordingStore};

fn store(dir: &TempDir) -> FsRecordingStore {
    // Non-WAV durations come from ffprobe; keep them unknown here
    FsRecordingStore::with_probe(
        dir.path(),
        DurationProbe::with_ffprobe("sound-recorder-test-missing-ffprobe"),
    )
}

fn write_wav(path: &Path, seconds: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..(8_000 * seconds) {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[tokio::test]
async fn list_skips_non_audio_files() {
    let dir = TempDir::new().unwrap();
    write_wav(&dir.path().join("memo.wav"), 1);
    fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    fs::create_dir(dir.path().join("nested.ogg")).unwrap();

    let entries = store(&dir).list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "memo.wav");
    assert_eq!(entries[0].mime.as_str(), "audio/wav");
    assert_eq!(entries[0].duration, Some(Duration::from_secs(1)));
}

#[cfg(unix)]
#[tokio::test]
async fn list_skips_dangling_symlink() {
    let dir = TempDir::new().unwrap();
    write_wav(&dir.path().join("kept.wav"), 1);
    std::os::unix::fs::symlink(dir.path().join("gone.wav"), dir.path().join("ghost.wav")).unwrap();

    let entries = store(&dir).list().await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["kept.wav"]);
}

#[tokio::test]
async fn missing_directory_lists_empty() {
    let dir = TempDir::new().unwrap();
    let store = FsRecordingStore::new(dir.path().join("not-yet"));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn duration_sort_puts_unknown_last() {
    let dir = TempDir::new().unwrap();
    write_wav(&dir.path().join("long.wav"), 3);
    write_wav(&dir.path().join("short.wav"), 1);
    fs::write(dir.path().join("opaque.ogg"), b"OggS").unwrap();

    let mut entries = store(&dir).list().await.unwrap();
    sort_entries(&mut entries, SortKey::Duration, false);
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["short.wav", "long.wav", "opaque.ogg"]);

    sort_entries(&mut entries, SortKey::Duration, true);
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["opaque.ogg", "long.wav", "short.wav"]);
}

#[tokio::test]
async fn filter_matches_case_insensitively() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Interview_A.ogg"), b"a").unwrap();
    fs::write(dir.path().join("lecture.m4a"), b"b").unwrap();

    let entries = store(&dir).list().await.unwrap();
    let kept = filter_entries(entries, "interview");
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].name, "Interview_A.ogg");
}

#[tokio::test]
async fn rename_keeps_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("take.ogg"), b"data").unwrap();
    let store = store(&dir);

    let renamed = store.rename("take", "meeting").await.unwrap();
    assert_eq!(renamed.name, "meeting.ogg");
    assert!(dir.path().join("meeting.ogg").exists());
    assert!(!dir.path().join("take.ogg").exists());

    // A typed extension is not doubled
    let renamed = store.rename("meeting.ogg", "standup.ogg").await.unwrap();
    assert_eq!(renamed.name, "standup.ogg");
}

#[tokio::test]
async fn rename_refuses_clobber_and_empty_names() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.ogg"), b"a").unwrap();
    fs::write(dir.path().join("b.ogg"), b"b").unwrap();
    let store = store(&dir);

    assert!(matches!(
        store.rename("a", "b").await,
        Err(StoreError::AlreadyExists(_))
    ));
    assert!(matches!(
        store.rename("a", "").await,
        Err(StoreError::InvalidName(_))
    ));
    assert_eq!(fs::read(dir.path().join("b.ogg")).unwrap(), b"b");
}

#[tokio::test]
async fn ambiguous_stem_needs_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("take.ogg"), b"a").unwrap();
    fs::write(dir.path().join("take.m4a"), b"b").unwrap();
    let store = store(&dir);

    assert!(matches!(
        store.get("take").await,
        Err(StoreError::InvalidName(_))
    ));
    assert_eq!(store.get("take.m4a").await.unwrap().size_bytes, 1);
}

#[tokio::test]
async fn delete_removes_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gone.3gp"), b"x").unwrap();
    let store = store(&dir);

    store.delete("gone").await.unwrap();
    assert!(!dir.path().join("gone.3gp").exists());
    assert!(matches!(
        store.delete("gone").await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn export_into_directory_and_to_file() {
    let library = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(library.path().join("song.m4a"), b"payload").unwrap();
    let store = store(&library);

    let copied = store.export("song", out.path()).await.unwrap();
    assert_eq!(copied, out.path().join("song.m4a"));
    assert_eq!(fs::read(&copied).unwrap(), b"payload");

    let named = out.path().join("copy.m4a");
    assert_eq!(store.export("song.m4a", &named).await.unwrap(), named);

    assert!(matches!(
        store.export("song", out.path()).await,
        Err(StoreError::AlreadyExists(_))
    ));
    assert!(library.path().join("song.m4a").exists());
}

#[tokio::test]
async fn default_names_skip_existing_files() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let first = store.next_default_name(OutputFormat::Wav);
    let name = first.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Recording_"));
    assert!(name.ends_with(".wav"));

    fs::write(&first, b"").unwrap();
    let second = store.next_default_name(OutputFormat::Wav);
    assert_ne!(first, second);
    assert_eq!(second.parent(), Some(dir.path()));
}
