//! Session State Model
//!
//! Tracks where a child process is in its lifecycle and exposes a
//! read-only summary for diagnostics.

use std::fmt;
use std::time::{Duration, Instant};

use super::Command;

/// Represents the state of a session's child process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Child is running
    #[default]
    Running,
    /// Child exited on its own; code is `None` when killed by a signal
    Exited(Option<i32>),
    /// Child was stopped by `terminate()`
    Terminated,
}

impl SessionState {
    /// Check if the child is still running
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Running => write!(f, "Running"),
            SessionState::Exited(Some(code)) => write!(f, "Exited (exit: {})", code),
            SessionState::Exited(None) => write!(f, "Exited (signal)"),
            SessionState::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Snapshot of session metadata
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Command that was launched
    pub command: Command,
    /// OS process identifier
    pub pid: u32,
    /// State at the time the info was taken
    pub state: SessionState,
    /// When the child was spawned
    pub started_at: Instant,
    /// Lines captured from stdout so far
    pub captured_lines: usize,
}

impl SessionInfo {
    /// Time since the child was spawned
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] - {} ({} lines)",
            self.command, self.pid, self.state, self.captured_lines
        )
    }
}
