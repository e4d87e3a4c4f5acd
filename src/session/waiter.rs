//! Pattern Waiter
//!
//! Bounded-time search for a pattern across a buffer's captured lines and
//! the lines still queued behind it. Every line the waiter receives is
//! appended to the buffer before it is tested, so waiting never loses
//! output, matched or not.

use std::fmt;
use std::time::Duration;

use regex::Regex;
use tokio::time::{timeout, Instant};

use super::buffer::LogBuffer;
use crate::error::{Error, Result};

/// What a caller waits for in the output
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Case-sensitive substring
    Substring(String),
    /// Regular expression searched anywhere in the line
    Regex(Regex),
}

impl Pattern {
    /// Compile a regular expression pattern
    pub fn regex(source: &str) -> Result<Self> {
        Ok(Pattern::Regex(Regex::new(source)?))
    }

    /// Test a single line
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Pattern::Substring(needle) => line.contains(needle.as_str()),
            Pattern::Regex(re) => re.is_match(line),
        }
    }

    /// Source text of the pattern
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Substring(needle) => needle,
            Pattern::Regex(re) => re.as_str(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Pattern {
    fn from(needle: &str) -> Self {
        Pattern::Substring(needle.to_string())
    }
}

impl From<String> for Pattern {
    fn from(needle: String) -> Self {
        Pattern::Substring(needle)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

/// One bounded wait for a pattern
#[derive(Debug, Clone)]
pub struct PatternWaiter {
    pattern: Pattern,
    timeout: Duration,
}

impl PatternWaiter {
    /// Create a waiter for `pattern` with a total budget of `timeout`
    pub fn new(pattern: impl Into<Pattern>, timeout: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            timeout,
        }
    }

    /// Pattern being waited for
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Total budget for the wait
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until the pattern appears in `buffer` or the budget runs out
    ///
    /// Returns immediately if a line already drained into the buffer (or
    /// still queued) matches. Otherwise receives queued lines one at a time,
    /// recomputing the remaining budget before every receive. Fails with
    /// [`Error::PatternTimeout`] when the deadline passes, or as soon as the
    /// pump has finished and nothing is left to receive.
    pub async fn wait(&self, buffer: &mut LogBuffer) -> Result<()> {
        // A budget too large for the clock never expires
        let deadline = Instant::now().checked_add(self.timeout);

        buffer.drain();
        if buffer.contains(&self.pattern) {
            trace!("\"{}\" already captured", self.pattern);
            return Ok(());
        }
        if buffer.is_closed() {
            debug!("{} closed before \"{}\" appeared", buffer.stream(), self.pattern);
            return Err(self.expired());
        }

        loop {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return self.final_drain(buffer);
                    }
                    match timeout(remaining, buffer.receiver().recv()).await {
                        Ok(received) => received,
                        Err(_) => return self.final_drain(buffer),
                    }
                }
                None => buffer.receiver().recv().await,
            };

            match received {
                Some(line) => {
                    let matched = self.pattern.matches(line.as_str());
                    buffer.push(line);
                    if matched {
                        trace!("\"{}\" matched after waiting", self.pattern);
                        return Ok(());
                    }
                }
                None => {
                    buffer.mark_closed();
                    debug!("{} closed before \"{}\" appeared", buffer.stream(), self.pattern);
                    return Err(self.expired());
                }
            }
        }
    }

    /// Lines that landed in the channel right at the deadline still count
    fn final_drain(&self, buffer: &mut LogBuffer) -> Result<()> {
        let start = buffer.len();
        buffer.drain();
        if buffer.lines()[start..]
            .iter()
            .any(|line| self.pattern.matches(line.as_str()))
        {
            return Ok(());
        }
        debug!("Timed out after {:?} waiting for \"{}\"", self.timeout, self.pattern);
        Err(self.expired())
    }

    fn expired(&self) -> Error {
        Error::PatternTimeout {
            pattern: self.pattern.to_string(),
            timeout: self.timeout,
        }
    }
}
