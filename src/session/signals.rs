//! Process Signals
//!
//! Sends stop signals to a session's child. On Unix this goes through
//! `nix`; elsewhere the caller falls back to `Child::kill`.

use crate::error::{Error, Result};

/// Signals a session may send to its child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Interrupt signal (Ctrl+C)
    Interrupt,
    /// Termination signal (graceful shutdown)
    Terminate,
    /// Kill signal (forceful termination)
    Kill,
}

/// Send `signal` to the process with the given PID
pub fn send_signal(pid: u32, signal: Signal) -> Result<()> {
    #[cfg(unix)]
    {
        send_unix_signal(pid, signal)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(Error::SignalNotSupported {
            signal: format!("{:?}", signal),
            platform: std::env::consts::OS.to_string(),
        })
    }
}

/// Send `signal` to every process in the group led by `pgid`
pub fn send_group_signal(pgid: u32, signal: Signal) -> Result<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::killpg;

        let group = unix_pid(pgid, signal)?;
        killpg(group, nix_signal(signal)).map_err(|e| Error::SignalSendFailed {
            signal: format!("{:?}", signal),
            reason: e.to_string(),
        })
    }

    #[cfg(not(unix))]
    {
        let _ = pgid;
        Err(Error::SignalNotSupported {
            signal: format!("{:?}", signal),
            platform: std::env::consts::OS.to_string(),
        })
    }
}

#[cfg(unix)]
fn send_unix_signal(pid: u32, signal: Signal) -> Result<()> {
    use nix::sys::signal::kill;

    let target = unix_pid(pid, signal)?;
    kill(target, nix_signal(signal)).map_err(|e| Error::SignalSendFailed {
        signal: format!("{:?}", signal),
        reason: e.to_string(),
    })
}

#[cfg(unix)]
fn nix_signal(signal: Signal) -> nix::sys::signal::Signal {
    use nix::sys::signal::Signal as NixSignal;

    match signal {
        Signal::Interrupt => NixSignal::SIGINT,
        Signal::Terminate => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    }
}

#[cfg(unix)]
fn unix_pid(pid: u32, signal: Signal) -> Result<nix::unistd::Pid> {
    let raw = i32::try_from(pid).map_err(|_| Error::SignalSendFailed {
        signal: format!("{:?}", signal),
        reason: format!("PID {} out of range", pid),
    })?;
    Ok(nix::unistd::Pid::from_raw(raw))
}
