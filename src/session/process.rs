//! Process Session
//!
//! Owns one child process from spawn to release. Starting a session
//! spawns the child and a pump per captured stream; dropping it (or
//! calling `terminate`) stops the child, joins the pumps and leaves every
//! line the child wrote in the buffers.

use std::io;
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::buffer::LogBuffer;
use super::pump::OutputPump;
use super::signals::{send_group_signal, send_signal, Signal};
use super::waiter::{Pattern, PatternWaiter};
use crate::config::{HarnessConfig, StderrMode};
use crate::error::{Error, Result};
use crate::models::{Command, SessionInfo, SessionState, StreamKind};

/// Poll interval while waiting out the SIGTERM grace period
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long a reaped child's pipes may take to report end-of-stream
const PIPE_SETTLE: Duration = Duration::from_millis(50);

/// A captured stream: its buffer and the pump feeding it
struct Capture {
    buffer: LogBuffer,
    pump: OutputPump,
}

impl Capture {
    fn start<R>(stream: StreamKind, reader: R) -> Result<Self>
    where
        R: io::Read + Send + 'static,
    {
        let (tx, buffer) = LogBuffer::channel(stream);
        let pump = OutputPump::spawn(stream, reader, tx)?;
        Ok(Self { buffer, pump })
    }
}

/// One running child and everything captured from it
pub struct ProcessSession {
    command: Command,
    child: Child,
    pid: u32,
    state: SessionState,
    started_at: Instant,
    stdout: Capture,
    stderr: Option<Capture>,
    terminate_grace: Option<Duration>,
    default_wait_timeout: Duration,
    pump_errors: Vec<Error>,
    released: bool,
}

impl ProcessSession {
    /// Spawn `command` with default harness settings
    pub fn start(command: Command) -> Result<Self> {
        Self::start_with_config(command, &HarnessConfig::default())
    }

    /// Spawn `command` and start pumping its output
    ///
    /// Fails with [`Error::Launch`] when the program cannot be spawned.
    pub fn start_with_config(command: Command, config: &HarnessConfig) -> Result<Self> {
        let mut child = Self::child_command(&command, config.stderr)
            .spawn()
            .map_err(|source| Error::Launch {
                command: command.to_string(),
                source,
            })?;
        let pid = child.id();
        info!("Started '{}' (pid {})", command, pid);

        let captures = Self::start_captures(&mut child, config.stderr);
        let (stdout, stderr) = match captures {
            Ok(captures) => captures,
            Err(e) => {
                warn!("Failed to start output capture for pid {}: {}", pid, e);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Launch {
                    command: command.to_string(),
                    source: io::Error::other(e.to_string()),
                });
            }
        };

        Ok(Self {
            command,
            child,
            pid,
            state: SessionState::Running,
            started_at: Instant::now(),
            stdout,
            stderr,
            terminate_grace: config.terminate_grace(),
            default_wait_timeout: config.default_wait_timeout(),
            pump_errors: Vec::new(),
            released: false,
        })
    }

    /// The child leads its own process group so signals reach anything it forks
    fn child_command(command: &Command, stderr_mode: StderrMode) -> std::process::Command {
        let mut cmd = std::process::Command::new(command.program());
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr_mode.to_stdio());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd
    }

    fn start_captures(
        child: &mut Child,
        stderr_mode: StderrMode,
    ) -> Result<(Capture, Option<Capture>)> {
        let stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
        let stdout = Capture::start(StreamKind::Stdout, stdout_pipe)?;

        let stderr = match (stderr_mode, child.stderr.take()) {
            (StderrMode::Capture, Some(pipe)) => Some(Capture::start(StreamKind::Stderr, pipe)?),
            _ => None,
        };
        Ok((stdout, stderr))
    }

    /// Command this session launched
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// OS process identifier of the child
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Last observed state, without polling the child
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check, without blocking, whether the child is still running
    pub fn is_alive(&mut self) -> bool {
        if self.state.is_running() {
            if let Ok(Some(status)) = self.child.try_wait() {
                debug!("pid {} exited on its own: {}", self.pid, status);
                self.state = SessionState::Exited(status.code());
            }
        }
        self.state.is_running()
    }

    /// Session metadata for diagnostics
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            command: self.command.clone(),
            pid: self.pid,
            state: self.state,
            started_at: self.started_at,
            captured_lines: self.stdout.buffer.len(),
        }
    }

    /// Everything captured from stdout so far; never blocks
    pub fn snapshot(&mut self) -> Vec<String> {
        self.stdout.buffer.snapshot()
    }

    /// Everything captured from stderr so far; empty unless stderr is captured
    pub fn stderr_snapshot(&mut self) -> Vec<String> {
        self.stderr
            .as_mut()
            .map(|capture| capture.buffer.snapshot())
            .unwrap_or_default()
    }

    /// Wait up to `timeout` for `pattern` to appear on stdout
    ///
    /// Fails only with [`Error::PatternTimeout`].
    pub async fn wait(&mut self, pattern: impl Into<Pattern>, timeout: Duration) -> Result<()> {
        PatternWaiter::new(pattern, timeout)
            .wait(&mut self.stdout.buffer)
            .await
    }

    /// Wait for `pattern` on stdout using the configured default budget
    pub async fn wait_default(&mut self, pattern: impl Into<Pattern>) -> Result<()> {
        let timeout = self.default_wait_timeout;
        self.wait(pattern, timeout).await
    }

    /// Wait up to `timeout` for `pattern` to appear on stderr
    pub async fn wait_for_stderr(
        &mut self,
        pattern: impl Into<Pattern>,
        timeout: Duration,
    ) -> Result<()> {
        let capture = self.stderr.as_mut().ok_or(Error::StreamNotCaptured {
            stream: StreamKind::Stderr,
        })?;
        PatternWaiter::new(pattern, timeout)
            .wait(&mut capture.buffer)
            .await
    }

    /// Send `signal` to the child only, leaving the session open
    ///
    /// Used to drive shutdown paths inside the child (e.g. SIGINT) while
    /// still observing its output. Fails if the child is no longer running.
    pub fn signal(&mut self, signal: Signal) -> Result<()> {
        if !self.is_alive() {
            return Err(Error::SignalSendFailed {
                signal: format!("{:?}", signal),
                reason: format!("pid {} is not running", self.pid),
            });
        }
        debug!("Sending {:?} to pid {}", signal, self.pid);
        send_signal(self.pid, signal)
    }

    /// Stop the child and release the pumps
    ///
    /// Sends SIGTERM to the child's process group (escalating to SIGKILL
    /// after the configured grace period, if any), reaps the child, drains
    /// the buffers and joins the pumps. Group members that outlive the child
    /// and keep its output open get the same treatment. Calling it again, or
    /// after the child exited on its own, does nothing beyond what is still
    /// outstanding; it never fails.
    pub fn terminate(&mut self) {
        if self.released {
            return;
        }

        // An unreaped leader keeps its pid, and so the group id, reserved
        if self.is_alive() {
            self.stop_child();
            self.state = SessionState::Terminated;
        } else if let Err(e) = self.child.wait() {
            debug!("Reaping pid {} failed: {}", self.pid, e);
        }
        self.stop_leftovers();

        self.stdout.buffer.drain();
        if let Some(stderr) = self.stderr.as_mut() {
            stderr.buffer.drain();
        }
        self.join_pumps();

        self.released = true;
        info!(
            "Released '{}' (pid {}): {}, {} stdout lines captured",
            self.command,
            self.pid,
            self.state,
            self.stdout.buffer.len()
        );
    }

    /// Read errors reported by the pumps, oldest first
    ///
    /// Populated once the pumps are joined by `terminate`.
    pub fn take_pump_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.pump_errors)
    }

    fn stop_child(&mut self) {
        if let Err(e) = send_group_signal(self.pid, Signal::Terminate) {
            warn!("SIGTERM to pid {} failed ({}), killing instead", self.pid, e);
            if let Err(e) = self.child.kill() {
                debug!("Kill of pid {} failed: {}", self.pid, e);
            }
        }

        let status = match self.terminate_grace {
            Some(grace) => self.wait_with_grace(grace),
            None => self.child.wait(),
        };
        match status {
            Ok(status) => debug!("pid {} stopped: {}", self.pid, status),
            Err(e) => warn!("Waiting for pid {} failed: {}", self.pid, e),
        }
    }

    fn wait_with_grace(&mut self, grace: Duration) -> io::Result<std::process::ExitStatus> {
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }

        warn!(
            "pid {} still running {:?} after SIGTERM, sending SIGKILL",
            self.pid, grace
        );
        if send_group_signal(self.pid, Signal::Kill).is_err() {
            self.child.kill()?;
        }
        self.child.wait()
    }

    /// Stop group members that outlived the leader and still hold the pipes
    ///
    /// Only signals while a pipe is open, since a live writer keeps the
    /// group id from being reused. With a grace period set, anything still
    /// holding a pipe after it gets SIGKILL.
    fn stop_leftovers(&mut self) {
        if self.wait_for_pumps(PIPE_SETTLE) {
            return;
        }

        debug!("Output of pid {} still open after exit, stopping its group", self.pid);
        if let Err(e) = send_group_signal(self.pid, Signal::Terminate) {
            debug!("Signalling process group {} failed: {}", self.pid, e);
            return;
        }

        if let Some(grace) = self.terminate_grace {
            if !self.wait_for_pumps(grace) {
                warn!(
                    "Process group {} still holds output {:?} after SIGTERM, sending SIGKILL",
                    self.pid, grace
                );
                if let Err(e) = send_group_signal(self.pid, Signal::Kill) {
                    debug!("Killing process group {} failed: {}", self.pid, e);
                }
            }
        }
    }

    /// Poll until every pump reached end-of-stream, up to `limit`
    fn wait_for_pumps(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            let finished = self.stdout.pump.is_finished()
                && self.stderr.as_ref().map_or(true, |c| c.pump.is_finished());
            if finished {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    fn join_pumps(&mut self) {
        let captures = std::iter::once(&mut self.stdout).chain(self.stderr.as_mut());
        for capture in captures {
            match capture.pump.join() {
                Ok(lines) => debug!("{} pump joined after {} lines", capture.pump.stream(), lines),
                Err(e) => {
                    error!("{} pump failed: {}", capture.pump.stream(), e);
                    self.pump_errors.push(e);
                }
            }
            capture.buffer.drain();
        }
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for ProcessSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSession")
            .field("command", &self.command)
            .field("pid", &self.pid)
            .field("state", &self.state)
            .field("released", &self.released)
            .finish()
    }
}
