//! Single worker execution
//!
//! A worker owns one bin and at most one runner process.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::models::{WorkerResult, WorkerStatus};
use crate::partition::Bin;
use crate::utils::timer::Timer;

/// Fully resolved runner command line for one bin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn for_bin(runner: &RunnerConfig, bin: &Bin) -> Self {
        let mut args = runner.base_args();
        args.push(runner.spec_arg(&bin.filter()));
        Self {
            program: runner.command.clone(),
            args,
        }
    }
}

impl fmt::Display for WorkerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs the external runner for one bin
pub struct Worker {
    bin: Bin,
    runner: Arc<RunnerConfig>,
    skip_empty: bool,
}

impl Worker {
    pub fn new(bin: Bin, runner: Arc<RunnerConfig>, skip_empty: bool) -> Self {
        Self {
            bin,
            runner,
            skip_empty,
        }
    }

    /// Command this worker runs, or `None` when its bin is skipped
    pub fn command(&self) -> Option<WorkerCommand> {
        if self.bin.is_empty() && self.skip_empty {
            None
        } else {
            Some(WorkerCommand::for_bin(&self.runner, &self.bin))
        }
    }

    /// Run to completion. Never fails: every outcome becomes a `WorkerResult`.
    pub async fn run(self) -> WorkerResult {
        let index = self.bin.index();
        let spec_count = self.bin.len();

        let Some(command) = self.command() else {
            info!("Worker {} has no specs, skipping", index);
            return WorkerResult::skipped(index);
        };

        info!("Worker {} starting with {} specs", index, spec_count);
        debug!("Worker {} command: {}", index, command);

        let timer = Timer::start(format!("worker {index}"));
        // `output` returns only after the process exits and both pipes hit EOF.
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await;
        let duration_ms = timer.stop();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                warn!("Worker {} failed to start {}: {}", index, command.program, e);
                let mut result = WorkerResult::spawn_failed(
                    index,
                    spec_count,
                    format!("failed to start {}: {e}", command.program),
                );
                result.duration_ms = duration_ms;
                return result;
            }
        };

        let status = if output.status.success() {
            WorkerStatus::Passed
        } else {
            WorkerStatus::Failed {
                exit_code: output.status.code(),
            }
        };

        if status.is_success() {
            info!("Worker {} finished in {}ms", index, duration_ms);
        } else {
            warn!("Worker {} finished with {} in {}ms", index, status, duration_ms);
        }

        WorkerResult {
            bin: index,
            spec_count,
            status,
            duration_ms,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
