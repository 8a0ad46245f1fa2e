//! Error scenario integration tests

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn sound_recorder_bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sound-recorder").expect("binary should be built");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_invalid_format() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "set", "output_format", "mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported output format"));
}

#[test]
fn config_set_invalid_channels() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "set", "channels", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be 1 or 2"));
}

#[test]
fn config_set_time_limit_above_ceiling() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "set", "limit_mode", "time"])
        .assert()
        .success();
    sound_recorder_bin(&home)
        .args(["config", "set", "limit_value", "301"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum of 300"));
}

#[test]
fn config_set_invalid_theme() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["config", "set", "theme", "neon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("system, light, dark"));
}

#[test]
fn record_rejects_oversized_time_limit() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["record", "--max-duration", "10m", "-o"])
        .arg(home.path().join("take.wav"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("between 1 and 300"));
}

#[test]
fn record_rejects_bad_duration_text() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["record", "--max-duration", "forever"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn record_rejects_unknown_extension() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["record", "--no-limit", "-o"])
        .arg(home.path().join("take.mp3"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported output format"));
}

#[test]
fn record_rejects_out_of_range_location() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["record", "--location", "95,10"])
        .assert()
        .code(2);
}

#[test]
fn invalid_format_flag_is_usage_error() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["record", "--format", "flac"])
        .assert()
        .code(2);
}

#[test]
fn rename_missing_recording() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["rename", "ghost", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Recording not found"));
}

#[test]
fn rename_onto_existing_recording() {
    let home = TempDir::new().unwrap();
    let library = home.path().join("library");
    fs::create_dir_all(&library).unwrap();
    fs::write(library.join("a.ogg"), b"x").unwrap();
    fs::write(library.join("b.ogg"), b"y").unwrap();

    sound_recorder_bin(&home)
        .args(["config", "set", "recordings_dir"])
        .arg(&library)
        .assert()
        .success();
    sound_recorder_bin(&home)
        .args(["rename", "a", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read(library.join("b.ogg")).unwrap(), b"y");
}

#[test]
fn delete_rejects_path_traversal() {
    let home = TempDir::new().unwrap();
    sound_recorder_bin(&home)
        .args(["delete", "../config/sound-recorder/config.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid recording name"));
}
