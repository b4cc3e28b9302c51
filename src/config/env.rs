//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;
use tracing::warn;

use super::RunConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "CYPRESS_PARALLEL";

/// Help text listing every recognised variable
pub const ENV_HELP: &str = "\
Environment Variables:
  CYPRESS_PARALLEL_CONFIG         Path to configuration file
  CYPRESS_PARALLEL_WORKERS        Number of parallel workers
  CYPRESS_PARALLEL_SPEC_DIR       Root directory searched for spec files
  CYPRESS_PARALLEL_MARKER         File name substring identifying spec files
  CYPRESS_PARALLEL_COMMAND        Runner executable
  CYPRESS_PARALLEL_RUNNER_CONFIG  Config file passed to the runner
  CYPRESS_PARALLEL_BROWSER        Browser passed to the runner
  CYPRESS_PARALLEL_FAIL_ON_ERROR  Exit nonzero when a worker fails (true/false)
  CYPRESS_PARALLEL_LOG_LEVEL      Log level (trace, debug, info, warn, error)";

/// Configuration overrides read from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Config file from CYPRESS_PARALLEL_CONFIG
    pub config_file: Option<PathBuf>,
    /// Worker count from CYPRESS_PARALLEL_WORKERS
    pub workers: Option<usize>,
    /// Spec root from CYPRESS_PARALLEL_SPEC_DIR
    pub spec_dir: Option<PathBuf>,
    /// Spec marker from CYPRESS_PARALLEL_MARKER
    pub spec_marker: Option<String>,
    /// Runner executable from CYPRESS_PARALLEL_COMMAND
    pub command: Option<String>,
    /// Runner config from CYPRESS_PARALLEL_RUNNER_CONFIG
    pub runner_config: Option<String>,
    /// Browser from CYPRESS_PARALLEL_BROWSER
    pub browser: Option<String>,
    /// Exit policy from CYPRESS_PARALLEL_FAIL_ON_ERROR
    pub fail_on_error: Option<bool>,
    /// Log level from CYPRESS_PARALLEL_LOG_LEVEL
    pub log_level: Option<String>,
    /// Set but unparseable variables
    invalid: Vec<(String, String)>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}")).filter(|v| !v.is_empty());

        let mut invalid = Vec::new();
        let workers = get("WORKERS").and_then(|v| match v.trim().parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => {
                invalid.push((format!("{ENV_PREFIX}_WORKERS"), v));
                None
            }
        });

        Self {
            config_file: get("CONFIG").map(PathBuf::from),
            workers,
            spec_dir: get("SPEC_DIR").map(PathBuf::from),
            spec_marker: get("MARKER"),
            command: get("COMMAND"),
            runner_config: get("RUNNER_CONFIG"),
            browser: get("BROWSER"),
            fail_on_error: get("FAIL_ON_ERROR").map(|v| parse_bool(&v)),
            log_level: get("LOG_LEVEL"),
            invalid,
        }
    }

    /// Variables that were set but could not be parsed, as `(name, value)`
    pub fn invalid(&self) -> &[(String, String)] {
        &self.invalid
    }

    /// Log every ignored variable. Call once logging is initialised.
    pub fn report_invalid(&self) {
        for (name, value) in &self.invalid {
            warn!("Ignoring {}={:?}: invalid value", name, value);
        }
    }

    /// Check if any run setting is overridden
    pub fn has_any(&self) -> bool {
        self.workers.is_some()
            || self.spec_dir.is_some()
            || self.spec_marker.is_some()
            || self.command.is_some()
            || self.runner_config.is_some()
            || self.browser.is_some()
            || self.fail_on_error.is_some()
    }

    /// Overlay the set variables onto a config
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(dir) = &self.spec_dir {
            config.spec_dir = dir.clone();
        }
        if let Some(marker) = &self.spec_marker {
            config.spec_marker = marker.clone();
        }
        if let Some(command) = &self.command {
            config.runner.command = command.clone();
        }
        if let Some(runner_config) = &self.runner_config {
            config.runner.config_file = runner_config.clone();
        }
        if let Some(browser) = &self.browser {
            config.runner.browser = browser.clone();
        }
        if let Some(fail) = self.fail_on_error {
            config.fail_on_worker_error = fail;
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}
