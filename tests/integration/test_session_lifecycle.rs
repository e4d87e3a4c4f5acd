//! Integration Tests for Session Lifecycle
//!
//! These tests verify that sessions start real children, capture their
//! output in order, and always release them: on terminate, on drop, and
//! when the owning code panics.

#![cfg(unix)]

use procwatch::{Command, HarnessConfig, ProcessSession, SessionState, StderrMode};
use std::time::{Duration, Instant};

/// Check whether a PID still names a live (or unreaped) process
fn process_exists(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Let a short-lived child finish on its own before releasing it
fn wait_for_exit(session: &mut ProcessSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.is_alive() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_lines_captured_in_order() {
    let mut session =
        ProcessSession::start(Command::shell("for i in 1 2 3 4 5; do echo \"L$i\"; done")).unwrap();
    wait_for_exit(&mut session);
    session.terminate();

    assert_eq!(session.snapshot(), ["L1", "L2", "L3", "L4", "L5"]);
}

#[test]
fn test_terminate_twice_does_not_fail() {
    let mut session = ProcessSession::start(Command::shell("echo started; exec sleep 30")).unwrap();

    session.terminate();
    assert!(session.snapshot().len() <= 1);
    let after_first = session.snapshot();
    session.terminate();

    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(session.snapshot(), after_first);
}

#[test]
fn test_terminate_after_natural_exit() {
    let mut session = ProcessSession::start(Command::shell("echo bye; exit 7")).unwrap();
    wait_for_exit(&mut session);

    session.terminate();
    assert_eq!(session.state(), SessionState::Exited(Some(7)));
    assert_eq!(session.snapshot(), ["bye"]);
}

#[test]
fn test_no_output_after_pipe_closed() {
    let mut session = ProcessSession::start(Command::shell("echo only; exec sleep 30")).unwrap();
    std::thread::sleep(Duration::from_millis(200));
    session.terminate();

    let captured = session.snapshot();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(session.snapshot(), captured);
    assert_eq!(captured, ["only"]);
}

#[test]
fn test_terminate_stops_forked_children() {
    // The shell stays in front of `sleep`, which inherits the stdout pipe
    let mut session =
        ProcessSession::start(Command::shell("echo parent; sleep 30; echo unreachable")).unwrap();
    std::thread::sleep(Duration::from_millis(200));

    let started = Instant::now();
    session.terminate();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(session.snapshot(), ["parent"]);
}

#[test]
fn test_drop_terminates_child() {
    let pid = {
        let session = ProcessSession::start(Command::shell("exec sleep 30")).unwrap();
        assert!(process_exists(session.pid()));
        session.pid()
    };

    assert!(!process_exists(pid), "child should be reaped when the session drops");
}

#[test]
fn test_panic_in_scope_still_terminates_child() {
    let (pid_tx, pid_rx) = std::sync::mpsc::channel();

    let result = std::thread::spawn(move || {
        let session = ProcessSession::start(Command::shell("exec sleep 30")).unwrap();
        pid_tx.send(session.pid()).unwrap();
        panic!("test body failed while the session was open");
    })
    .join();

    assert!(result.is_err());
    let pid = pid_rx.recv().unwrap();
    assert!(!process_exists(pid), "child should be reaped during unwinding");
}

#[test]
fn test_kill_escalation_for_child_ignoring_sigterm() {
    let config = HarnessConfig {
        terminate_grace_ms: Some(200),
        ..Default::default()
    };
    let mut session = ProcessSession::start_with_config(
        Command::shell("trap '' TERM; echo stubborn; while :; do sleep 0.05; done"),
        &config,
    )
    .unwrap();

    // Give the shell time to install the trap before signalling it
    std::thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    session.terminate();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(session.state(), SessionState::Terminated);
    assert!(!process_exists(session.pid()));
}

/// Run `terminate` off-thread so a hang fails the test instead of stalling it
fn terminate_within(mut session: ProcessSession, limit: Duration) -> ProcessSession {
    let pgid = session.pid();
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        session.terminate();
        let _ = done_tx.send(session);
    });

    match done_rx.recv_timeout(limit) {
        Ok(session) => session,
        Err(_) => {
            let _ = nix::sys::signal::killpg(
                nix::unistd::Pid::from_raw(pgid as i32),
                nix::sys::signal::Signal::SIGKILL,
            );
            panic!("terminate still blocked after {:?}", limit);
        }
    }
}

#[test]
fn test_background_job_outliving_child_is_stopped() {
    let mut session = ProcessSession::start(Command::shell("sleep 30 & echo up")).unwrap();
    wait_for_exit(&mut session);
    assert_eq!(session.state(), SessionState::Exited(Some(0)));

    let session = terminate_within(session, Duration::from_secs(5));
    assert_eq!(session.state(), SessionState::Exited(Some(0)));
}

#[test]
fn test_stubborn_background_job_killed_after_grace() {
    let config = HarnessConfig {
        terminate_grace_ms: Some(200),
        ..Default::default()
    };
    let mut session = ProcessSession::start_with_config(
        Command::shell("(trap '' TERM; while :; do sleep 0.05; done) & echo up"),
        &config,
    )
    .unwrap();
    wait_for_exit(&mut session);
    // Let the subshell install its trap
    std::thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    let mut session = terminate_within(session, Duration::from_secs(5));

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(session.snapshot(), ["up"]);
    assert_eq!(session.state(), SessionState::Exited(Some(0)));
}

#[tokio::test]
async fn test_stderr_captured_separately() {
    let mut session =
        ProcessSession::start(Command::shell("echo out; echo err >&2; exec sleep 30")).unwrap();

    session.wait("out", Duration::from_secs(5)).await.unwrap();
    session
        .wait_for_stderr("err", Duration::from_secs(5))
        .await
        .unwrap();
    session.terminate();

    assert_eq!(session.snapshot(), ["out"]);
    assert_eq!(session.stderr_snapshot(), ["err"]);
}

#[tokio::test]
async fn test_stderr_inherit_mode_has_no_capture() {
    let config = HarnessConfig {
        stderr: StderrMode::Inherit,
        ..Default::default()
    };
    let mut session =
        ProcessSession::start_with_config(Command::shell("echo out; exec sleep 30"), &config)
            .unwrap();

    let result = session.wait_for_stderr("anything", Duration::from_millis(10)).await;
    assert!(matches!(result, Err(procwatch::Error::StreamNotCaptured { .. })));
    assert!(session.stderr_snapshot().is_empty());
}

#[test]
fn test_session_info() {
    let mut session = ProcessSession::start(Command::new(["/bin/echo", "hello"]).unwrap()).unwrap();
    wait_for_exit(&mut session);
    session.terminate();

    let info = session.info();
    assert_eq!(info.command.to_string(), "/bin/echo hello");
    assert_eq!(info.captured_lines, 1);
    assert!(!info.state.is_running());
}
