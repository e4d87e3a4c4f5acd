//! Integration Tests for Error Handling
//!
//! These tests verify that broken preconditions surface as distinct
//! errors and that an expired wait is reported as a timeout, not a fault.

#![cfg(unix)]

use procwatch::{Command, Error, Pattern, ProcessSession};
use std::time::Duration;

#[test]
fn test_missing_binary_is_launch_error() {
    let command = Command::new(["/nonexistent/procwatch_binary_xyz123", "--flag"]).unwrap();
    let err = ProcessSession::start(command).unwrap_err();

    match err {
        Error::Launch { command, source } => {
            assert_eq!(command, "/nonexistent/procwatch_binary_xyz123 --flag");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected launch error, got {:?}", other),
    }
}

#[test]
fn test_non_executable_file_is_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("not_executable.sh");
    std::fs::write(&script, "#!/bin/sh\necho never\n").unwrap();

    let command = Command::new([script.to_string_lossy().to_string()]).unwrap();
    let err = ProcessSession::start(command).unwrap_err();

    match err {
        Error::Launch { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected launch error, got {:?}", other),
    }
}

#[test]
fn test_empty_command_rejected_before_spawn() {
    assert!(matches!(Command::new(Vec::<String>::new()), Err(Error::EmptyCommand)));
}

#[test]
fn test_invalid_regex_rejected() {
    let err = Pattern::regex("listening on [").unwrap_err();
    assert!(matches!(err, Error::InvalidPattern(_)));
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_timeout_carries_pattern_and_budget() {
    let mut session = ProcessSession::start(Command::shell("exec sleep 30")).unwrap();

    let err = session
        .wait(Pattern::regex(r"port \d+").unwrap(), Duration::from_millis(30))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    let message = err.to_string();
    assert!(message.contains(r"port \d+"), "message was: {}", message);
    assert!(message.contains("30ms"), "message was: {}", message);
}

#[test]
fn test_failing_child_is_not_an_error() {
    let mut session = ProcessSession::start(Command::shell("echo oops >&2; exit 1")).unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while session.is_alive() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    session.terminate();

    assert_eq!(session.state(), procwatch::SessionState::Exited(Some(1)));
    assert_eq!(session.stderr_snapshot(), ["oops"]);
    assert!(session.take_pump_errors().is_empty());
}
