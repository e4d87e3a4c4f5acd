//! Error types and Result aliases for procwatch

use std::path::PathBuf;
use std::time::Duration;

use crate::models::StreamKind;
use crate::report::TraceMode;

/// Result type alias for procwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for procwatch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === Process errors ===
    /// The child process could not be started
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Command has no program to run
    #[error("Command cannot be empty")]
    EmptyCommand,

    /// Failed to send a signal to the child
    #[error("Failed to send signal '{signal}': {reason}")]
    SignalSendFailed { signal: String, reason: String },

    /// Signal delivery not available on this platform
    #[error("Signal '{signal}' not supported on {platform}")]
    SignalNotSupported { signal: String, platform: String },

    // === Capture errors ===
    /// The background reader hit a read error that was not a clean EOF
    #[error("Failed to read child {stream}: {source}")]
    PumpRead {
        stream: StreamKind,
        #[source]
        source: std::io::Error,
    },

    /// The background reader thread panicked
    #[error("The {stream} pump thread panicked")]
    PumpPanicked { stream: StreamKind },

    /// The requested stream is not being captured by this session
    #[error("Child {stream} is not captured by this session")]
    StreamNotCaptured { stream: StreamKind },

    // === Wait errors ===
    /// The pattern was not observed before the deadline
    #[error("Timeout waiting for \"{pattern}\" in output after {timeout:?}")]
    PatternTimeout { pattern: String, timeout: Duration },

    /// A regular expression pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // === Configuration errors ===
    /// Failed to read a configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration contents
    #[error("Failed to parse TOML config: {reason}")]
    ConfigParseFailed { reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === Reporting errors ===
    /// Unknown trace mode string
    #[error("Invalid traces value: {0} (expected none, target or all)")]
    InvalidTraceMode(String),

    /// Trace mode is recognised but cannot be rendered here
    #[error("Trace mode '{0}' is not supported")]
    TraceModeUnsupported(TraceMode),

    /// Logging could not be initialised
    #[error("Failed to initialise logging: {reason}")]
    LoggingInit { reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a wait deadline expiring rather than a fault
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::PatternTimeout { .. })
    }
}
