//! CLI integration tests

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Binary with config and data directories isolated under `home`
fn sound_recorder_bin(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sound-recorder"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

/// Minimal 16-bit mono WAV with `frames` silent frames
fn silent_wav(frames: u32) -> Vec<u8> {
    let data_len = frames * 2;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8_000u32.to_le_bytes());
    out.extend_from_slice(&16_000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + data_len as usize, 0);
    out
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["record", "devices", "list", "rename", "delete", "export", "config"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
    assert!(stdout.contains("--verbose"));
}

#[test]
fn record_help_lists_options() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .args(["record", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("--quality"));
    assert!(stdout.contains("--max-duration"));
    assert!(stdout.contains("--max-size"));
    assert!(stdout.contains("--location"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sound-recorder"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sound-recorder"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_set_get_and_list() {
    let home = TempDir::new().unwrap();

    let output = sound_recorder_bin(&home)
        .args(["config", "set", "output_format", "wav"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = sound_recorder_bin(&home)
        .args(["config", "get", "output_format"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "wav");

    let output = sound_recorder_bin(&home)
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("output_format"));
    assert!(stdout.contains("(not set)"));
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    let first = sound_recorder_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = sound_recorder_bin(&home)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));
}

#[test]
fn list_empty_library() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .args(["list", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn library_round_trip() {
    let home = TempDir::new().unwrap();
    let library = home.path().join("library");
    fs::create_dir_all(&library).unwrap();
    fs::write(library.join("first.wav"), silent_wav(8_000)).unwrap();

    let set = sound_recorder_bin(&home)
        .args(["config", "set", "recordings_dir"])
        .arg(&library)
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success());

    let list = sound_recorder_bin(&home)
        .args(["list"])
        .output()
        .expect("Failed to execute command");
    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("first.wav"));
    assert!(stdout.contains("00:01"));
    assert!(stdout.contains("audio/wav"));

    let rename = sound_recorder_bin(&home)
        .args(["rename", "first", "interview"])
        .output()
        .expect("Failed to execute command");
    assert!(rename.status.success());
    assert!(library.join("interview.wav").exists());

    let export_dir = home.path().join("out");
    fs::create_dir_all(&export_dir).unwrap();
    let export = sound_recorder_bin(&home)
        .args(["export", "interview.wav"])
        .arg(&export_dir)
        .output()
        .expect("Failed to execute command");
    assert!(export.status.success());
    assert!(export_dir.join("interview.wav").exists());

    let delete = sound_recorder_bin(&home)
        .args(["delete", "interview"])
        .output()
        .expect("Failed to execute command");
    assert!(delete.status.success());
    assert!(!library.join("interview.wav").exists());
}

#[test]
fn list_sort_is_remembered() {
    let home = TempDir::new().unwrap();
    let output = sound_recorder_bin(&home)
        .args(["list", "--sort", "size", "-r"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = sound_recorder_bin(&home)
        .args(["config", "get", "sort_mode"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "size");

    let output = sound_recorder_bin(&home)
        .args(["config", "get", "sort_reverse"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");
}
