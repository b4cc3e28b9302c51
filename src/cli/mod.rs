//! CLI argument parsing
//!
//! Defines command-line interface using clap. Every flag is optional and
//! only overrides the layers below it when given.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{RunConfig, ENV_HELP};

/// Run Cypress spec files across parallel runner processes
#[derive(Parser, Debug)]
#[command(name = "cypress-parallel")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Split Cypress specs round-robin and run them in parallel")]
#[command(long_about = None)]
#[command(after_help = ENV_HELP)]
pub struct Args {
    /// Config file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write an example config file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_config: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Root directory searched for spec files
    #[arg(short, long)]
    pub spec_dir: Option<PathBuf>,

    /// File name substring identifying spec files
    #[arg(short, long)]
    pub marker: Option<String>,

    /// Runner executable
    #[arg(long)]
    pub command: Option<String>,

    /// Argument placed before `run` (repeatable)
    #[arg(long = "command-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub command_args: Vec<String>,

    /// Config file passed to the runner via --config-file
    #[arg(long)]
    pub runner_config: Option<String>,

    /// Browser passed to the runner
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Run the browser headed (drops --headless)
    #[arg(long)]
    pub headed: bool,

    /// Pass the spec list without surrounding single quotes
    #[arg(long)]
    pub no_quote: bool,

    /// Visit directory entries in the order the OS returns them
    #[arg(long)]
    pub no_sort: bool,

    /// Invoke the runner for bins without specs
    #[arg(long)]
    pub run_empty_bins: bool,

    /// Exit with status 1 when any worker fails
    #[arg(long)]
    pub fail_on_error: bool,

    /// Print the worker commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format (text, json, json-pretty); with json the other
    /// output moves to stderr
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Disable coloured output (off anyway when stdout is not a terminal)
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Apply flags that were given on the command line
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(dir) = &self.spec_dir {
            config.spec_dir = dir.clone();
        }
        if let Some(marker) = &self.marker {
            config.spec_marker = marker.clone();
        }
        if let Some(command) = &self.command {
            config.runner.command = command.clone();
        }
        if !self.command_args.is_empty() {
            config.runner.command_args = self.command_args.clone();
        }
        if let Some(runner_config) = &self.runner_config {
            config.runner.config_file = runner_config.clone();
        }
        if let Some(browser) = &self.browser {
            config.runner.browser = browser.clone();
        }
        if self.headed {
            config.runner.headless = false;
        }
        if self.no_quote {
            config.runner.quote_spec_arg = false;
        }
        if self.no_sort {
            config.sort_specs = false;
        }
        if self.run_empty_bins {
            config.skip_empty_bins = false;
        }
        if self.fail_on_error {
            config.fail_on_worker_error = true;
        }
    }
}
