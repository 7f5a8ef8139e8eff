//! Integration tests for input handling: gzip, directories, missing files.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::{logweave, merged_lines, write_log};

#[test]
fn gzip_input_is_decompressed() {
    let dir = TempDir::new().unwrap();
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"2020-01-01 10:00:01 from gzip\n").unwrap();
    let gz = dir.path().join("old.log.gz");
    std::fs::write(&gz, enc.finish().unwrap()).unwrap();
    let plain = write_log(dir.path(), "new.log", "2020-01-01 10:00:00 from plain\n");

    let lines = merged_lines(&[], &[gz, plain]);
    assert_eq!(
        lines,
        vec![
            "10:00:00 | new.log    | <T> from plain",
            "10:00:01 | old.log.gz | <T> from gzip",
        ]
    );
}

#[test]
fn directory_is_expanded() {
    let dir = TempDir::new().unwrap();
    write_log(dir.path(), "logs/a.log", "2020-01-01 10:00:02 a\n");
    write_log(dir.path(), "logs/nested/b.log", "2020-01-01 10:00:01 b\n");

    let lines = merged_lines(&[], &[dir.path().join("logs")]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("<T> b"));
    assert!(lines[1].ends_with("<T> a"));
}

#[test]
fn missing_file_is_fatal() {
    logweave()
        .args(["--quiet", "/definitely/missing.log"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("missing.log"));
}

#[test]
fn corrupt_gzip_is_fatal() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.gz");
    // Valid gzip header followed by a deflate block of reserved type
    let mut bytes = vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0x03];
    bytes.extend_from_slice(&[0xff; 16]);
    std::fs::write(&bad, bytes).unwrap();
    logweave()
        .arg("--quiet")
        .arg(&bad)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("decompress"));
}

#[test]
fn banner_lists_inputs() {
    let dir = TempDir::new().unwrap();
    let a = write_log(dir.path(), "a.log", "2020-01-01 10:00:00 a\n");
    logweave()
        .arg("--color=never")
        .arg(&a)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "Including file {}\n\n",
            a.display()
        )));
}

#[test]
fn no_paths_is_usage_error() {
    logweave().assert().failure();
}
