//! CLI integration tests for `logweave`.

mod config_rules;
mod input_files;
mod merge_order;
mod output_style;

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// The binary, isolated from any user configuration.
#[allow(deprecated)]
pub fn logweave() -> Command {
    let mut cmd = Command::cargo_bin("logweave").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/logweave-test-no-config");
    cmd.env_remove("LOGWEAVE_LOG");
    cmd.env_remove("FORCE_COLOR");
    cmd
}

/// Write `content` to `dir/name` and return the path.
pub fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Run with plain, banner-free output and return stdout lines.
///
/// Timestamps are printed as `%H:%M:%S` unless `args` picks a format.
pub fn merged_lines(args: &[&str], paths: &[PathBuf]) -> Vec<String> {
    let mut cmd = logweave();
    cmd.args(["--quiet", "--color=never"]);
    if !args.contains(&"-t") {
        cmd.args(["-t", "%H:%M:%S"]);
    }
    let output = cmd
        .args(args)
        .args(paths)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "logweave failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
