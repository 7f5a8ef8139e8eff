//! Integration tests for chronological merging and continuation handling.

use tempfile::TempDir;

use crate::{logweave, merged_lines, write_log};

#[test]
fn interleaves_two_files() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        "2020-01-01 10:00:00 a first\n2020-01-01 10:00:05 a second\n",
    );
    let b = write_log(dir.path(), "b.log", "2020-01-01 10:00:02 b only\n");

    let lines = merged_lines(&[], &[a, b]);
    assert_eq!(
        lines,
        vec![
            "10:00:00 | a.log | <T> a first",
            "10:00:02 | b.log | <T> b only",
            "10:00:05 | a.log | <T> a second",
        ]
    );
}

#[test]
fn regression_stays_with_its_entry() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        "2020-01-01 12:00:00 systemctl status\n2020-01-01 11:59:00 embedded output\n",
    );
    let b = write_log(
        dir.path(),
        "b.log",
        "2020-01-01 11:59:30 b early\n2020-01-01 12:00:30 b late\n",
    );

    let lines = merged_lines(&[], &[a, b]);
    assert_eq!(
        lines,
        vec![
            "11:59:30 | b.log | <T> b early",
            "12:00:00 | a.log | <T> systemctl status",
            "12:00:00 |       | 2020-01-01 11:59:00 embedded output",
            "12:00:30 | b.log | <T> b late",
        ]
    );
}

#[test]
fn multiline_entries_are_kept_together() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "app.log",
        "2020-01-01 10:00:00 Exception\n    at Foo.bar\n    at Foo.main\n",
    );
    let b = write_log(dir.path(), "db.log", "2020-01-01 10:00:01 checkpoint\n");

    let lines = merged_lines(&[], &[a, b]);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with("|     at Foo.bar"));
    assert!(lines[2].ends_with("|     at Foo.main"));
    assert!(lines[3].contains("db.log"));
}

#[test]
fn unparsed_leading_lines_warn_once() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        "=== banner ===\nversion 1.2\nboot\n2020-01-01 10:00:00 ready\n",
    );

    let output = logweave()
        .args(["--quiet", "--color=never"])
        .arg(&a)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("skipping unparsed lines").count(), 1);
    assert!(!stdout.contains("banner"));
    assert!(!stdout.contains("boot"));
    assert!(stdout.contains("ready"));
}

#[test]
fn after_cutoff_hides_older_entries() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        "2020-01-01 09:00:00 old\n  old detail\n2020-01-01 11:00:00 new\n",
    );

    let lines = merged_lines(&["--after", "2020-01-01 10:00:00"], &[a]);
    assert_eq!(lines, vec!["11:00:00 | a.log | <T> new"]);
}

#[test]
fn redacted_prefix_round_trips() {
    let dir = TempDir::new().unwrap();
    let a = write_log(dir.path(), "a.log", "2020-10-05 16:06:40 hello\n");

    let lines = merged_lines(&["-t", "%Y-%m-%d %H:%M:%S"], &[a]);
    let (prefix, rest) = lines[0].split_once(" | ").unwrap();
    let decoded = logweave::Resolver::new().infer(prefix).unwrap();
    assert_eq!(decoded, "2020-10-05T16:06:40Z".parse::<jiff::Timestamp>().unwrap());
    assert!(!rest.contains("2020-10-05 16:06:40"));
}
