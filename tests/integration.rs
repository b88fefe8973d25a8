//! Integration tests for the settlers binary.
//!
//! Spawns the binary with a snapshot on stdin or on disk and checks what it
//! prints.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use settlers::board::generate::beginner_board;
use settlers::protocol::HdcsDocument;

/// Runs the binary with `args`, feeding `stdin` to it.
fn run_settlers(args: &[&str], stdin: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_settlers");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start settlers");

    let mut pipe = child.stdin.take().unwrap();
    pipe.write_all(stdin.as_bytes()).unwrap();
    drop(pipe);

    child.wait_with_output().expect("failed to wait on child")
}

fn beginner_snapshot() -> String {
    HdcsDocument::from_board(&beginner_board(), 0).to_json().unwrap()
}

#[test]
fn ranks_options_for_a_random_board() {
    let out = run_settlers(&["--random", "7", "--x", "2", "--max-window", "4", "--serial"], "");
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let options: Vec<&str> = text.lines().filter(|l| l.contains(" settle ")).collect();
    assert_eq!(options.len(), 2);
    assert!(options[0].starts_with(" 1. settle "));
    assert!(options[1].starts_with(" 2. settle "));
    assert!(text.lines().any(|l| l.trim_start().starts_with("p=")));
}

#[test]
fn json_report_from_stdin() {
    let out = run_settlers(&["--json", "--x", "2", "--max-window", "3"], &beginner_snapshot());
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let options = value["options"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    for option in options {
        let share = option["expected_share"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&share));
        assert_eq!(option["placement"]["player"], 0);
        let placeouts = option["placeouts"].as_array().unwrap();
        assert!(!placeouts.is_empty() && placeouts.len() <= 3);
    }
}

#[test]
fn snapshot_file_argument() {
    let path = std::env::temp_dir().join(format!("settlers-{}.json", std::process::id()));
    std::fs::write(&path, beginner_snapshot()).unwrap();
    let out = run_settlers(&["--x", "1", "--max-window", "2", path.to_str().unwrap()], "");
    let _ = std::fs::remove_file(&path);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.starts_with(" 1. settle "));
}

#[test]
fn config_file_is_validated() {
    let path = std::env::temp_dir().join(format!("settlers-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"search": {"max_window": 0}}"#).unwrap();
    let out = run_settlers(&["--random", "1", "--config", path.to_str().unwrap()], "");
    let _ = std::fs::remove_file(&path);
    assert_eq!(out.status.code(), Some(2));
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.contains("configuration error"));
}

#[test]
fn malformed_snapshot_fails_cleanly() {
    let out = run_settlers(&[], "{\"meta\": {}}");
    assert_eq!(out.status.code(), Some(2));
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.contains("malformed board"));
}

#[test]
fn unknown_flag_prints_usage() {
    let out = run_settlers(&["--bogus"], "");
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8(out.stderr).unwrap();
    assert!(err.contains("Unknown argument: --bogus"));
    assert!(err.contains("Usage: settlers"));
}

#[test]
fn help_exits_cleanly() {
    let out = run_settlers(&["--help"], "");
    assert!(out.status.success());
}
