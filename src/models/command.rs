//! Command Model
//!
//! The program and arguments a session launches. A command is fixed
//! once built; sessions only ever read it.

use std::fmt;

use crate::error::{Error, Result};

/// Program followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    /// Build a command from an argv list; the first element is the program
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.first().map_or(true, |program| program.is_empty()) {
            return Err(Error::EmptyCommand);
        }
        Ok(Self { argv })
    }

    /// Build a command that runs `script` through `/bin/sh -c`
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            argv: vec!["/bin/sh".to_string(), "-c".to_string(), script.into()],
        }
    }

    /// Program path or name
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Full argv including the program
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = Error;

    fn try_from(argv: Vec<String>) -> Result<Self> {
        Self::new(argv)
    }
}

impl TryFrom<&[&str]> for Command {
    type Error = Error;

    fn try_from(argv: &[&str]) -> Result<Self> {
        Self::new(argv.iter().copied())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}
