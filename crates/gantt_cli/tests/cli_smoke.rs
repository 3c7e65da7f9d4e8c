use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("ganttgen-{nanos}-{file_name}"))
}

#[test]
fn help_command_succeeds() {
    let exe = env!("CARGO_BIN_EXE_ganttgen");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run help command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
    assert!(stdout.contains("generate"));
}

#[test]
fn models_command_marks_default() {
    let exe = env!("CARGO_BIN_EXE_ganttgen");
    let output = Command::new(exe)
        .arg("models")
        .env("GANTTGEN_CONFIG_PATH", temp_path("missing-config.json"))
        .output()
        .expect("failed to run models command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gpt-4o-mini (default)"));
    assert!(stdout.contains("gpt-4.1"));
}

#[test]
fn unknown_command_is_reported() {
    let exe = env!("CARGO_BIN_EXE_ganttgen");
    let output = Command::new(exe)
        .arg("nope")
        .output()
        .expect("failed to run unknown command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn bad_override_is_reported() {
    let exe = env!("CARGO_BIN_EXE_ganttgen");
    let output = Command::new(exe)
        .args(["validate", "[]", "--config-override", "bar_height=tall"])
        .env("GANTTGEN_CONFIG_PATH", temp_path("missing-config.json"))
        .output()
        .expect("failed to run validate command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("bar_height must be a number"));
}

#[test]
fn extract_rejects_config_overrides() {
    let exe = env!("CARGO_BIN_EXE_ganttgen");
    let output = Command::new(exe)
        .args(["extract", "[1]", "--config-override", "title=Ignored"])
        .env("GANTTGEN_CONFIG_PATH", temp_path("missing-config.json"))
        .output()
        .expect("failed to run extract command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("no effect on `extract`"));
}
