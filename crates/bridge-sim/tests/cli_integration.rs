//! Integration tests for the axi-bridge-sim CLI.

use bridge_core as _;
use bridge_sim as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("axi-bridge-sim")
}

fn scenario_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn run_prints_responses_in_admission_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "order.bridge",
        "config max_requests=2 read_latency=5 write_latency=0\nread 0x0\nwrite 0x4 0x1\n",
    );

    let output = Command::new(binary_path())
        .args(["run", source.to_str().unwrap(), "--stats"])
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().filter(|line| line.starts_with("cycle")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("read  (line 2)"));
    assert!(lines[1].contains("write (line 3)"));
    assert!(stdout.contains("granted=2"));
}

#[test]
fn check_passes_bundled_scenarios() {
    for name in ["ordering.bridge", "errors.bridge", "widening.bridge"] {
        let output = Command::new(binary_path())
            .args(["check", scenario_path(name).to_str().unwrap()])
            .output()
            .expect("failed to run axi-bridge-sim");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "{name} failed:\n{stdout}");
        assert!(stdout.contains("0 failed"), "{name}:\n{stdout}");
    }
}

#[test]
fn check_fails_on_mismatched_expectation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "wrong.bridge",
        "write 0x0 0x5\nread 0x0\nexpect write\nexpect read data=0x6\n",
    );

    let output = Command::new(binary_path())
        .args(["check", source.to_str().unwrap()])
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PASS (line 3)"));
    assert!(stdout.contains("FAIL (line 4)"));
    assert!(stdout.contains("1 passed, 1 failed"));
}

#[test]
fn parse_error_reports_file_and_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "bad.bridge", "read 0x0\nburst 0x4\n");

    let output = Command::new(binary_path())
        .args(["run", source.to_str().unwrap()])
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.bridge: line 2: unknown directive 'burst'"));
}

#[test]
fn cycle_limit_aborts_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "slow.bridge",
        "config cycle_limit=4 read_latency=100\nread 0x0\ndrain\n",
    );

    let output = Command::new(binary_path())
        .args(["run", source.to_str().unwrap()])
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 3: cycle limit of 4 exceeded"));
}

#[test]
fn missing_file_fails_cleanly() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("absent.bridge");

    let status = Command::new(binary_path())
        .args(["check", missing.to_str().unwrap()])
        .status()
        .expect("failed to run axi-bridge-sim");

    assert!(!status.success());
}

#[test]
fn verbose_run_logs_to_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "log.bridge", "read 0x0\n");

    let output = Command::new(binary_path())
        .args(["run", source.to_str().unwrap(), "-v"])
        .env("RUST_LOG", "debug")
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("scenario loaded"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("scenario loaded"));
}

#[test]
fn help_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run axi-bridge-sim");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: axi-bridge-sim"));
}
