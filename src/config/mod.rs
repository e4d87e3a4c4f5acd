//! Configuration management for procwatch
//!
//! Harness-wide defaults: how long waits last when the caller does not
//! say, how stderr is handled, how hard `terminate()` pushes, and which
//! traces get printed after a run.

pub mod loader;

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::report::TraceMode;

pub use loader::ConfigLoader;

/// Default wait budget when none is given
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Main configuration structure for procwatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Budget for waits that do not pass their own timeout
    pub default_wait_timeout_ms: u64,

    /// How long to wait after SIGTERM before sending SIGKILL; unset waits forever
    pub terminate_grace_ms: Option<u64>,

    /// What happens to the child's stderr
    pub stderr: StderrMode,

    /// Which captured lines to print after a run
    pub traces: TraceMode,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            default_wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            terminate_grace_ms: None,
            stderr: StderrMode::default(),
            traces: TraceMode::All,
        }
    }
}

impl HarnessConfig {
    /// Default wait budget as a `Duration`
    pub fn default_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.default_wait_timeout_ms)
    }

    /// SIGKILL escalation delay as a `Duration`
    pub fn terminate_grace(&self) -> Option<Duration> {
        self.terminate_grace_ms.map(Duration::from_millis)
    }
}

/// Handling of the child's stderr stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrMode {
    /// Pump stderr into its own buffer
    #[default]
    Capture,
    /// Let stderr go wherever the harness's own stderr goes
    Inherit,
    /// Send stderr to the null device
    Discard,
}

impl StderrMode {
    /// `Stdio` to hand to the spawned child
    pub fn to_stdio(self) -> Stdio {
        match self {
            StderrMode::Capture => Stdio::piped(),
            StderrMode::Inherit => Stdio::inherit(),
            StderrMode::Discard => Stdio::null(),
        }
    }
}
