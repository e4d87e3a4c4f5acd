//! Child Process Sessions
//!
//! This module drives one child process per session: spawning it,
//! pumping its output off blocking pipes on dedicated threads, keeping
//! an ordered record of every captured line, and waiting with a bounded
//! deadline for a pattern to show up in that record.

pub mod buffer;
pub mod process;
pub mod pump;
pub mod signals;
pub mod waiter;

// Re-exports for convenience
pub use buffer::LogBuffer;
pub use process::ProcessSession;
pub use pump::OutputPump;
pub use signals::Signal;
pub use waiter::{Pattern, PatternWaiter};
