//! procwatch - drive a child process and wait for its output
//!
//! This library launches an externally built executable, drains its
//! output on background threads without ever blocking the child, and
//! lets test code look at everything captured so far or wait, with a
//! bounded deadline, for a pattern to show up.
//!
//! ## Module Organization
//!
//! - [`session`] - Process sessions, output pumps, log buffers, pattern waits
//! - [`models`] - Data structures (Command, OutputLine, SessionState)
//! - [`config`] - Harness configuration and TOML loading
//! - [`report`] - Selecting captured traces to print after a run
//! - [`logging`] - `tracing` subscriber setup
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use procwatch::{Command, ProcessSession};
//! use std::time::Duration;
//!
//! # async fn run() -> procwatch::Result<()> {
//! let command = Command::new(["./target/debug/server", "--port", "7878"])?;
//! let mut session = ProcessSession::start(command)?;
//!
//! // Block until the server says it is ready, for at most five seconds
//! session.wait("listening on 127.0.0.1:7878", Duration::from_secs(5)).await?;
//!
//! // ... talk to the server ...
//!
//! for line in session.snapshot() {
//!     println!("{}", line);
//! }
//! // Dropping the session terminates the child and joins its pumps
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Pump threads:** one OS thread per captured stream performs the only
//!   blocking reads and pushes lines onto an unbounded channel
//! - **Callers:** drain that channel into an append-only buffer on
//!   `snapshot()` and `wait()`; waits use `tokio::time::timeout` with the
//!   remaining budget recomputed for every receive
//!
//! Buffer order is always the order the child wrote its lines.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod session;

// Re-exports for core functionality
pub use config::{ConfigLoader, HarnessConfig, StderrMode};
pub use error::{Error, Result};
pub use models::{Command, OutputLine, SessionInfo, SessionState, StreamKind};
pub use report::{render_traces, write_traces, TraceMode};
pub use session::{LogBuffer, OutputPump, Pattern, PatternWaiter, ProcessSession, Signal};

/// The current version of procwatch from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
