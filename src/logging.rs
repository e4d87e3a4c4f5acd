//! Logging setup
//!
//! Installs a compact `tracing` subscriber on stderr so harness logs
//! never interleave with child output relayed on stdout.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable that turns on debug logging
pub const DEBUG_ENV_VAR: &str = "PROCWATCH_DEBUG";

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` if requested
/// (by flag or `PROCWATCH_DEBUG=1|true`) and `info` if not.
pub fn init(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug, debug_from_env())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init()
        .map_err(|e| Error::LoggingInit {
            reason: e.to_string(),
        })
}

fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV_VAR).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn default_level(flag: bool, env: bool) -> &'static str {
    if flag || env {
        "debug"
    } else {
        "info"
    }
}
