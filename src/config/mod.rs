//! Configuration module
//!
//! Builds the single `RunConfig` a run is driven by. Layers apply in
//! increasing precedence: built-in defaults, config file, environment
//! variables, command-line flags.

mod env;
mod file;

pub use env::{EnvConfig, ENV_HELP};
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Number of parallel workers when nothing else is configured
pub const DEFAULT_WORKERS: usize = 2;

/// External runner executable
pub const DEFAULT_COMMAND: &str = "cypress";

/// Config file handed to the runner via `--config-file`
pub const DEFAULT_RUNNER_CONFIG: &str = "docker.cypress.config.ts";

/// Root directory searched for spec files
pub const DEFAULT_SPEC_DIR: &str = "cypress/e2e";

pub const DEFAULT_BROWSER: &str = "chrome";

/// Substring a file name must contain to count as a spec file
pub const DEFAULT_SPEC_MARKER: &str = ".spec.";

/// Configuration errors detected before any work starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Worker count must be at least 1 (got {0})")]
    InvalidWorkerCount(usize),

    #[error("Runner command must not be empty")]
    EmptyCommand,

    #[error("Spec marker must not be empty")]
    EmptySpecMarker,
}

/// External runner invocation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Executable invoked once per bin
    pub command: String,

    /// Leading arguments placed before `run`, e.g. `cypress` for `npx cypress`
    pub command_args: Vec<String>,

    /// Value for `--browser`
    pub browser: String,

    /// Pass `--headless`
    pub headless: bool,

    /// Value for `--config-file`
    pub config_file: String,

    /// Wrap the spec list in single quotes
    pub quote_spec_arg: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            command_args: Vec::new(),
            browser: DEFAULT_BROWSER.to_string(),
            headless: true,
            config_file: DEFAULT_RUNNER_CONFIG.to_string(),
            quote_spec_arg: true,
        }
    }
}

impl RunnerConfig {
    /// Constant arguments that precede the spec list
    pub fn base_args(&self) -> Vec<String> {
        let mut args = self.command_args.clone();
        args.extend([
            "run".to_string(),
            "--browser".to_string(),
            self.browser.clone(),
        ]);
        if self.headless {
            args.push("--headless".to_string());
        }
        args.push("--config-file".to_string());
        args.push(self.config_file.clone());
        args.push("--spec".to_string());
        args
    }

    /// Render a bin filter as the final runner argument
    pub fn spec_arg(&self, filter: &str) -> String {
        if self.quote_spec_arg {
            format!("'{filter}'")
        } else {
            filter.to_string()
        }
    }
}

/// Configuration for one parallel run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of bins, and therefore concurrent runner processes
    pub workers: usize,

    /// Root directory searched for spec files
    pub spec_dir: PathBuf,

    /// File name substring identifying spec files
    pub spec_marker: String,

    /// Sort each directory listing by name before visiting it
    pub sort_specs: bool,

    /// Do not invoke the runner for bins without files
    pub skip_empty_bins: bool,

    /// Exit nonzero when any worker fails
    pub fail_on_worker_error: bool,

    pub runner: RunnerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            spec_dir: PathBuf::from(DEFAULT_SPEC_DIR),
            spec_marker: DEFAULT_SPEC_MARKER.to_string(),
            sort_specs: true,
            skip_empty_bins: true,
            fail_on_worker_error: false,
            runner: RunnerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Reject settings that would make partitioning or spawning meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.runner.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.spec_marker.is_empty() {
            return Err(ConfigError::EmptySpecMarker);
        }
        Ok(())
    }
}
