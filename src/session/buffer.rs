//! Log Buffer
//!
//! The ordered record of everything a pump has produced. The buffer owns
//! the receiving end of the pump's channel; lines only move from the
//! channel into the buffer through `drain` (or the waiter's receive), and
//! once appended they are never removed or reordered.

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::waiter::Pattern;
use crate::models::{OutputLine, StreamKind};

/// Append-only record of captured lines plus the channel feeding it
#[derive(Debug)]
pub struct LogBuffer {
    stream: StreamKind,
    lines: Vec<OutputLine>,
    rx: UnboundedReceiver<OutputLine>,
    closed: bool,
}

impl LogBuffer {
    /// Create a buffer and the sender half its pump writes into
    pub fn channel(stream: StreamKind) -> (UnboundedSender<OutputLine>, Self) {
        let (tx, rx) = unbounded_channel();
        let buffer = Self {
            stream,
            lines: Vec::new(),
            rx,
            closed: false,
        };
        (tx, buffer)
    }

    /// Stream this buffer records
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Move every line currently queued into the buffer without waiting
    ///
    /// Returns the number of lines appended.
    pub fn drain(&mut self) -> usize {
        let before = self.lines.len();
        loop {
            match self.rx.try_recv() {
                Ok(line) => self.lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        self.lines.len() - before
    }

    /// Drain, then copy out everything captured so far
    ///
    /// Never blocks. Lines the pump has not yet pushed are not included.
    pub fn snapshot(&mut self) -> Vec<String> {
        self.drain();
        self.lines.iter().map(|line| line.as_str().to_string()).collect()
    }

    /// Lines captured as of the last drain, without draining
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Number of lines captured as of the last drain
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if nothing has been captured as of the last drain
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Check if any line captured as of the last drain matches
    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.lines.iter().any(|line| pattern.matches(line.as_str()))
    }

    /// Whether the pump is gone and no more lines can arrive
    ///
    /// Only observed through draining; a closed channel may still hold
    /// lines until the next drain.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append one line received outside of `drain`
    pub(crate) fn push(&mut self, line: OutputLine) {
        self.lines.push(line);
    }

    /// Receiver for the waiter's bounded receive
    pub(crate) fn receiver(&mut self) -> &mut UnboundedReceiver<OutputLine> {
        &mut self.rx
    }

    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }
}
