//! Core data models for procwatch
//!
//! This module contains the plain data structures shared by the
//! session machinery: the command to launch, captured output lines,
//! and the observable state of a running child.

pub mod command;
pub mod output_line;
pub mod session_state;

// Re-exports for convenience
pub use command::Command;
pub use output_line::{OutputLine, StreamKind};
pub use session_state::{SessionInfo, SessionState};
