//! Integration tests for user rule files.

use predicates::prelude::*;
use tempfile::TempDir;

use crate::{logweave, merged_lines, write_log};

#[test]
fn user_rule_extends_defaults() {
    let dir = TempDir::new().unwrap();
    let config = write_log(
        dir.path(),
        "config.toml",
        "[[match]]\nmatch = '^<(\\d{2}\\.\\d{2}\\.\\d{4} \\d{2}:\\d{2})>'\nformat = \"%d.%m.%Y %H:%M\"\n",
    );
    let a = write_log(dir.path(), "a.log", "<01.01.2020 10:05> custom layout\n");
    let b = write_log(dir.path(), "b.log", "2020-01-01 10:00:00 default layout\n");

    let config = config.to_string_lossy().into_owned();
    let lines = merged_lines(&["--config", &config], &[a, b]);
    assert_eq!(
        lines,
        vec![
            "10:00:00 | b.log | <T> default layout",
            "10:05:00 | a.log | <<T>> custom layout",
        ]
    );
}

#[test]
fn bad_pattern_aborts_before_merging() {
    let dir = TempDir::new().unwrap();
    let config = write_log(dir.path(), "config.toml", "[[match]]\nmatch = '(unclosed'\n");
    let a = write_log(dir.path(), "a.log", "2020-01-01 10:00:00 x\n");
    logweave()
        .arg("--config")
        .arg(&config)
        .arg(&a)
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("invalid timestamp pattern"));
}

#[test]
fn show_default_config() {
    logweave()
        .arg("--show-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[[match]]"));
}

#[test]
fn show_user_config() {
    let dir = TempDir::new().unwrap();
    let config = write_log(dir.path(), "config.toml", "# mine\n");
    logweave()
        .arg("--show-user-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout("# mine\n");
}

#[test]
fn bad_timezone_in_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_log(dir.path(), "config.toml", "timezone = \"Not/AZone\"\n");
    let a = write_log(dir.path(), "a.log", "2020-01-01 10:00:00 x\n");
    logweave()
        .arg("--config")
        .arg(&config)
        .arg(&a)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not/AZone"));
}
