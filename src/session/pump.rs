//! Output Pump
//!
//! Bridges a blocking child pipe to the rest of the session through an
//! unbounded channel. The pump thread is the only place that performs
//! blocking reads, and the only producer on its channel.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Error, Result};
use crate::models::{OutputLine, StreamKind};

/// Background reader for one child stream
pub struct OutputPump {
    stream: StreamKind,
    handle: Option<JoinHandle<Result<usize>>>,
}

impl OutputPump {
    /// Start pumping `reader` line by line into `tx`
    pub fn spawn<R>(stream: StreamKind, reader: R, tx: UnboundedSender<OutputLine>) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("procwatch-{}-pump", stream))
            .spawn(move || pump_lines(stream, reader, &tx))?;

        debug!("Started {} pump", stream);
        Ok(Self {
            stream,
            handle: Some(handle),
        })
    }

    /// Stream this pump reads from
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Check if the pump thread has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Wait for the pump to reach end-of-stream
    ///
    /// Once this returns, every line the pump read has been pushed onto the
    /// channel. Returns the number of lines pushed, or the read error that
    /// ended the loop. Joining an already joined pump returns `Ok(0)`.
    pub fn join(&mut self) -> Result<usize> {
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(Error::PumpPanicked {
                stream: self.stream,
            }),
        }
    }
}

fn pump_lines<R: Read>(
    stream: StreamKind,
    reader: R,
    tx: &UnboundedSender<OutputLine>,
) -> Result<usize> {
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::with_capacity(256);
    let mut pushed = 0;

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                debug!("{} pump reached EOF after {} lines", stream, pushed);
                return Ok(pushed);
            }
            Ok(_) => {
                if tx.send(OutputLine::from_raw(&raw)).is_err() {
                    debug!("{} pump: receiver dropped, stopping", stream);
                    return Ok(pushed);
                }
                pushed += 1;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                debug!("{} read interrupted (EINTR), retrying...", stream);
                continue;
            }
            Err(e) => {
                error!("{} read error ({}): {}", stream, e.kind(), e);
                return Err(Error::PumpRead { stream, source: e });
            }
        }
    }
}
