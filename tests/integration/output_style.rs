//! Integration tests for output layouts, timestamps, and color control.

use tempfile::TempDir;

use crate::{logweave, merged_lines, write_log};

fn two_files(dir: &TempDir) -> Vec<std::path::PathBuf> {
    vec![
        write_log(dir.path(), "a.log", "2020-01-01 10:00:00 a1\n2020-01-01 10:00:03 a2\n"),
        write_log(dir.path(), "b.log", "2020-01-01 10:00:01 b1\n"),
    ]
}

#[test]
fn no_timestamp_prefix() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-n"], &two_files(&dir));
    assert_eq!(lines[0], "a.log | <T> a1");
}

#[test]
fn dont_replace_keeps_original_text() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-d"], &two_files(&dir));
    assert_eq!(lines[0], "10:00:00 | a.log | 2020-01-01 10:00:00 a1");
}

#[test]
fn custom_replacement_token() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-r", "@"], &two_files(&dir));
    assert_eq!(lines[0], "10:00:00 | a.log | @ a1");
}

#[test]
fn tail_style_output() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-F"], &two_files(&dir));
    assert_eq!(
        lines,
        vec![
            "",
            "==> a.log <==",
            "2020-01-01 10:00:00 a1",
            "",
            "==> b.log <==",
            "2020-01-01 10:00:01 b1",
            "",
            "==> a.log <==",
            "2020-01-01 10:00:03 a2",
        ]
    );
}

#[test]
fn alt_style_output() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-G"], &two_files(&dir));
    assert_eq!(&lines[..3], &["", "==> a.log <==", "10:00:00 | <T> a1"]);
}

#[test]
fn separator_between_files() {
    let dir = TempDir::new().unwrap();
    let lines = merged_lines(&["-s"], &two_files(&dir));
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("======== | ===== | ="));
}

#[test]
fn invalid_timezone_is_config_error() {
    let dir = TempDir::new().unwrap();
    let a = write_log(dir.path(), "a.log", "2020-01-01 10:00:00 x\n");
    logweave()
        .args(["-z", "Mars/Olympus_Mons"])
        .arg(&a)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn color_never_disables_ansi() {
    let dir = TempDir::new().unwrap();
    let output = logweave()
        .arg("--color=never")
        .args(two_files(&dir))
        .output()
        .unwrap();
    assert!(!String::from_utf8_lossy(&output.stdout).contains("\x1b["));
}

#[test]
fn color_always_enables_ansi() {
    let dir = TempDir::new().unwrap();
    let output = logweave()
        .arg("--color=always")
        .args(two_files(&dir))
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("\x1b["));
}

#[test]
fn color_auto_off_when_piped() {
    let dir = TempDir::new().unwrap();
    let output = logweave().args(two_files(&dir)).output().unwrap();
    assert!(!String::from_utf8_lossy(&output.stdout).contains("\x1b["));
}

#[test]
fn timezone_offset_flag() {
    let dir = TempDir::new().unwrap();
    let a = write_log(dir.path(), "a.log", "2020-01-01T10:00:00Z tz\n");
    let lines = merged_lines(&["-z", "+02:00"], &[a]);
    assert!(lines[0].starts_with("12:00:00 | "), "got {}", lines[0]);
}

#[test]
fn timezone_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_log(dir.path(), "config.toml", "timezone = \"-03:00\"\n");
    let a = write_log(dir.path(), "a.log", "2020-01-01T10:00:00Z tz\n");
    let config = config.to_string_lossy().into_owned();
    let lines = merged_lines(&["--config", &config], &[a]);
    assert!(lines[0].starts_with("07:00:00 | "), "got {}", lines[0]);
}
