//! Integration Tests for Large Output Handling
//!
//! These tests verify that pumps keep draining children that write far
//! more than a pipe can hold, so the child never stalls on a full pipe.

#![cfg(unix)]

use procwatch::{Command, ProcessSession};
use std::time::Duration;

#[tokio::test]
async fn test_many_lines_keep_order() {
    let mut session = ProcessSession::start(Command::shell(
        "i=1; while [ $i -le 5000 ]; do echo \"Line $i\"; i=$((i+1)); done; echo done; exec sleep 30",
    ))
    .unwrap();

    session.wait("done", Duration::from_secs(30)).await.unwrap();

    let lines = session.snapshot();
    assert_eq!(lines.len(), 5001);
    for (i, line) in lines.iter().take(5000).enumerate() {
        assert_eq!(line, &format!("Line {}", i + 1));
    }
}

#[tokio::test]
async fn test_output_larger_than_pipe_buffer() {
    // Far beyond the 64 KiB Linux pipe capacity
    let mut session = ProcessSession::start(Command::shell(
        "head -c 1048576 /dev/zero | tr '\\0' 'x' | fold -w 1024; echo; echo finished; exec sleep 30",
    ))
    .unwrap();

    session.wait("finished", Duration::from_secs(30)).await.unwrap();

    let lines = session.snapshot();
    assert_eq!(lines.iter().filter(|l| l.len() == 1024).count(), 1024);
}

#[tokio::test]
async fn test_very_long_single_line() {
    let mut session = ProcessSession::start(Command::shell(
        "head -c 200000 /dev/zero | tr '\\0' 'y'; echo; echo end; exec sleep 30",
    ))
    .unwrap();

    session.wait("end", Duration::from_secs(30)).await.unwrap();

    let lines = session.snapshot();
    assert_eq!(lines[0].len(), 200_000);
    assert!(lines[0].chars().all(|c| c == 'y'));
}

#[tokio::test]
async fn test_heavy_stderr_does_not_stall_child() {
    let mut session = ProcessSession::start(Command::shell(
        "head -c 524288 /dev/zero | tr '\\0' 'e' | fold -w 512 >&2; echo survived; exec sleep 30",
    ))
    .unwrap();

    session.wait("survived", Duration::from_secs(30)).await.unwrap();
    session.terminate();

    assert_eq!(session.stderr_snapshot().len(), 1024);
}
