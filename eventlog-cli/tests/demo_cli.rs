//! Integration tests for the eventlog-demo binary.
//!
//! Each test runs the binary against a temporary log directory and checks
//! the files the routing table produces.
//!
//! Run with: `cargo test -p eventlog-cli --test demo_cli`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_demo(log_dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eventlog-demo"))
        .arg("--log-dir")
        .arg(log_dir)
        .args(extra)
        .env_remove("EVENTLOG_LEVEL")
        .output()
        .expect("failed to run eventlog-demo")
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("cannot read {}: {}", relative, e))
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_calculator_demo_writes_its_own_file() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["calculator"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let calculator = read(temp.path(), "logsCalculadora/calculator.log");
    assert!(calculator.contains("INFO  calculator - Addition result: 15"));
    assert!(calculator.contains("Division result: 2"));
    assert!(!calculator.contains("Calculator started"), "debug is off by default");

    let app = read(temp.path(), "logs/app.log");
    assert!(app.contains("main - Starting calculator module"));
    assert!(read(temp.path(), "logsEstudiantes/student.log").is_empty());
}

#[test]
fn test_level_directive_enables_debug_for_one_logger() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["--level", "warn,calculator=debug", "calculator"]);
    assert!(output.status.success());

    let calculator = read(temp.path(), "logsCalculadora/calculator.log");
    assert!(calculator.contains("DEBUG calculator - Calculator started"));

    let app = read(temp.path(), "logs/app.log");
    assert!(!app.contains("Starting calculator module"), "main is at warn");
}

#[test]
fn test_auth_demo_fills_audit_log() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["auth"]);
    assert!(output.status.success());

    let audit = read(temp.path(), "logs/audit.log");
    assert!(audit.contains("{AUDIT} - Login successful for user: admin@example.com"));
    assert!(audit.contains("{AUDIT} - User registered successfully: email=new@example.com"));
    assert!(audit.lines().all(|line| line.contains("{AUDIT}")));

    let app = read(temp.path(), "logs/app.log");
    assert!(app.contains("{SECURITY} - Failed login attempt for user: user@example.com"));
    assert!(app.contains("ERROR auth - Invalid email provided: invalid-email"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Successful login: true"));
    assert!(stdout.contains("Failed login: false"));
}

#[test]
fn test_context_demo_tags_records() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["context"]);
    assert!(output.status.success());

    let app = read(temp.path(), "logs/app.log");
    assert!(app.contains("[requestId=REQ-1001, userId=USR-12345]"));
    assert!(app.contains("[requestId=REQ-1002, userId=USR-67890]"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_level_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["--level", "calculator=chatty", "levels"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"));
}

#[test]
fn test_unknown_demo_is_rejected() {
    let temp = TempDir::new().unwrap();
    let output = run_demo(temp.path(), &["nonexistent"]);
    assert!(!output.status.success());
}
