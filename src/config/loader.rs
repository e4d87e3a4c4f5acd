//! Configuration File Loading
//!
//! Finds and parses the harness TOML configuration, falling back to
//! defaults when no file is present.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::HarnessConfig;
use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PROCWATCH_CONFIG";

/// Configuration file loader
pub struct ConfigLoader {
    /// Candidate files, most specific first
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader using the environment and platform config directory
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
        }
    }

    /// Create a loader that only considers the given files
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Load configuration
    ///
    /// An explicit path must exist and parse. Otherwise the first existing
    /// search path is used, and defaults apply when none exist.
    pub fn load(&self, explicit: Option<&Path>) -> Result<HarnessConfig> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in &self.search_paths {
            if path.is_file() {
                debug!("Loading config from {}", path.display());
                return Self::load_file(path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(HarnessConfig::default())
    }

    /// Load and validate one TOML file
    pub fn load_file(path: &Path) -> Result<HarnessConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<HarnessConfig> {
        let config: HarnessConfig = toml::from_str(content).map_err(|e| Error::ConfigParseFailed {
            reason: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Render a configuration back to TOML
    pub fn to_toml_string(config: &HarnessConfig) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| Error::ConfigParseFailed {
            reason: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(config: &HarnessConfig) -> Result<()> {
        if config.default_wait_timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "default_wait_timeout_ms".to_string(),
                reason: "Wait timeout must be greater than 0".to_string(),
            });
        }

        if config.terminate_grace_ms == Some(0) {
            return Err(Error::ConfigValidationFailed {
                field: "terminate_grace_ms".to_string(),
                reason: "Grace period must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }

    /// Candidate config files
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            if !explicit.is_empty() {
                paths.push(PathBuf::from(explicit));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("procwatch").join("config.toml"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join("procwatch.toml"));
        }

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
