//! Trace Reporting
//!
//! Decides which captured lines get printed once a run is over, so a
//! test report can carry the child's output next to the verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which traces to print after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// Print nothing
    None,
    /// Only traces emitted by the code under test
    Target,
    /// Everything the child printed
    #[default]
    All,
}

impl FromStr for TraceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(TraceMode::None),
            "target" => Ok(TraceMode::Target),
            "all" => Ok(TraceMode::All),
            other => Err(Error::InvalidTraceMode(other.to_string())),
        }
    }
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceMode::None => write!(f, "none"),
            TraceMode::Target => write!(f, "target"),
            TraceMode::All => write!(f, "all"),
        }
    }
}

/// Select the lines to print for `mode`
///
/// `Target` needs tagged log records to tell test-code traces apart from
/// runtime traces, which this crate does not parse, so it is refused.
pub fn render_traces(mode: TraceMode, lines: &[String]) -> Result<Vec<String>> {
    match mode {
        TraceMode::All => Ok(lines.to_vec()),
        TraceMode::None => Ok(Vec::new()),
        TraceMode::Target => Err(Error::TraceModeUnsupported(mode)),
    }
}

/// Write the selected traces with a leading blank line, as test reports expect
pub fn write_traces<W: std::io::Write>(
    out: &mut W,
    mode: TraceMode,
    lines: &[String],
) -> Result<()> {
    let traces = render_traces(mode, lines)?;
    if traces.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    for trace in &traces {
        writeln!(out, "{}", trace)?;
    }
    Ok(())
}
