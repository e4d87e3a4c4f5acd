//! Output Line Model
//!
//! Represents a single line of child output. Lines carry no timestamp
//! or structure; their order is the position they occupy in the buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which child stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single line of child output with its terminator removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputLine {
    text: String,
}

impl OutputLine {
    /// Create a line from already-split text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Create a line from raw bytes as read from a pipe
    ///
    /// Strips one trailing `\n` and a `\r` right before it, then decodes
    /// lossily so a stray invalid byte never drops the whole line.
    pub fn from_raw(raw: &[u8]) -> Self {
        let mut end = raw.len();
        if end > 0 && raw[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && raw[end - 1] == b'\r' {
                end -= 1;
            }
        }
        Self {
            text: String::from_utf8_lossy(&raw[..end]).into_owned(),
        }
    }

    /// Line text without terminator
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the line into its text
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for OutputLine {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
