//! CLI integration tests for fgb-stress

use std::io::Write;
use std::process::Command;

/// Helper to run the harness with arguments
fn run_stress(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fgb-stress"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let output = run_stress(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--accounts"));
    assert!(stdout.contains("--threads"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--max-op-amount"));
}

#[test]
fn test_cli_version() {
    let output = run_stress(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fgb-stress"));
}

// ==================== Run Tests ====================

#[test]
fn test_small_run_text() {
    let output = run_stress(&[
        "--accounts", "4", "--threads", "3", "--ops", "500", "--seed", "1",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1500 ops on 4 accounts by 3 threads"));
    assert!(stdout.contains("all invariants held"));
}

#[test]
fn test_small_run_json() {
    let output = run_stress(&[
        "--accounts", "5", "--threads", "2", "--ops", "300", "--seed", "3", "--json",
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["accounts"], 5);
    assert_eq!(report["operations"], 600);
    assert_eq!(report["seed"], 3);
    assert_eq!(report["violations"].as_array().unwrap().len(), 0);
    assert_eq!(report["final_total"], report["expected_total"]);
}

#[test]
fn test_run_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "threads = 2\nops_per_thread = 200\ninitial_deposit = 10\nseed = 5\n[ledger]\naccounts = 3\nmax_amount = 50"
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let output = run_stress(&["--config", path, "--json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["accounts"], 3);
    assert_eq!(report["initial_total"], 30);
}

#[test]
fn test_invalid_config_fails() {
    let output = run_stress(&["--threads", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("threads"));
}

#[test]
fn test_max_op_amount_flag() {
    let output = run_stress(&["--max-op-amount", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_op_amount"));

    let max = i64::MAX.to_string();
    let output = run_stress(&[
        "--accounts", "1", "--max-amount", &max, "--max-op-amount", &max, "--initial-deposit", "0",
        "--threads", "2", "--ops", "200", "--seed", "4", "--json",
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["violations"].as_array().unwrap().len(), 0);
}
