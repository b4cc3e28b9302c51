//! cypress-parallel - Parallel Cypress spec runner
//!
//! Finds every spec file under a root directory, deals them round-robin
//! into one bin per worker and runs the Cypress CLI once per bin, all bins
//! at the same time. Each worker's output is printed as soon as that worker
//! finishes, followed by a completion marker once every worker is done.
//!
//! ## Usage
//!
//! ```bash
//! # Two workers over cypress/e2e with docker.cypress.config.ts
//! cypress-parallel
//!
//! # Four workers through npx, failing the build when any worker fails
//! cypress-parallel -w 4 --command npx --command-arg cypress --fail-on-error
//!
//! # Show how specs would be split without running anything
//! cypress-parallel --dry-run
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod output;
mod partition;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig, RunConfig};
use discovery::SpecDiscovery;
use executor::Coordinator;
use output::{OutputFormat, OutputReporter, ResultFormatter};
use partition::Partition;
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = LogLevel::resolve(
        args.log_level.as_deref().or(env.log_level.as_deref()),
        args.verbose,
    );
    init_logger(level);
    env.report_invalid();

    if let Some(path) = &args.init_config {
        ConfigFile::example().save(path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&args, &env)?;
    run(&args, &config).await
}

fn load_config(args: &Args, env: &EnvConfig) -> Result<RunConfig> {
    let file = match args.config.as_ref().or(env.config_file.as_ref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    merge_config(file, env, args)
}

/// Layer environment and flags over a loaded config file, then validate
fn merge_config(file: ConfigFile, env: &EnvConfig, args: &Args) -> Result<RunConfig> {
    let mut config = file.run;
    if env.has_any() {
        debug!("Applying environment overrides");
        env.apply_to(&mut config);
    }
    args.apply_to(&mut config);

    config.validate().context("Invalid configuration")?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

async fn run(args: &Args, config: &RunConfig) -> Result<ExitCode> {
    let format = OutputFormat::from_str(&args.format).unwrap_or_else(|| {
        warn!("Unknown output format {:?}, using text", args.format);
        OutputFormat::Text
    });
    let mut formatter = ResultFormatter::new(format);
    if args.no_color {
        formatter = formatter.no_color();
    }
    let progress: Box<dyn Write> = if format.is_json() {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut reporter = OutputReporter::new(io::stdout(), progress, formatter);

    let specs = SpecDiscovery::new(&config.spec_dir, config.spec_marker.as_str())
        .sorted(config.sort_specs)
        .discover()
        .with_context(|| format!("Failed to discover specs in {}", config.spec_dir.display()))?;
    info!(
        "Found {} spec files in {}",
        specs.len(),
        config.spec_dir.display()
    );

    let partition = Partition::round_robin(specs, config.workers)?;
    info!(
        "Assigned {} specs to {} workers ({} empty)",
        partition.total_files(),
        config.workers,
        partition.empty_bins()
    );
    reporter.assignment(&partition)?;

    let coordinator = Coordinator::from_config(config);

    if args.dry_run {
        reporter.plan(&coordinator.plan(&partition))?;
        return Ok(ExitCode::SUCCESS);
    }

    let summary = coordinator
        .run(partition, |result| {
            if let Err(e) = reporter.worker_finished(result) {
                warn!("Failed to print output of worker {}: {}", result.bin, e);
            }
        })
        .await;

    reporter.completed()?;
    reporter.summary(&summary, config.fail_on_worker_error)?;

    if !summary.is_all_passed() {
        warn!("Failed workers: {:?}", summary.failed_bins());
    }
    if summary.fails_run(config.fail_on_worker_error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
