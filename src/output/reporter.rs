//! Console reporting for a parallel run
//!
//! Every block is assembled first and handed to its sink in a single
//! write, so output from different workers never mixes line by line.
//!
//! The summary goes to `out`. Assignment lines, worker output and the
//! completion marker go to `progress`, which is stdout for text output and
//! stderr when the summary is JSON, so stdout stays parseable.

use std::io::{self, Write};

use super::formatter::ResultFormatter;
use crate::executor::WorkerCommand;
use crate::models::{RunSummary, WorkerResult, WorkerStatus};
use crate::partition::Partition;

/// Marker printed once every worker has been joined
pub const COMPLETED_MARKER: &str = "Cypress Test Completed";

pub struct OutputReporter<W: Write, P: Write> {
    out: W,
    progress: P,
    formatter: ResultFormatter,
}

impl<W: Write, P: Write> OutputReporter<W, P> {
    pub fn new(out: W, progress: P, formatter: ResultFormatter) -> Self {
        Self {
            out,
            progress,
            formatter,
        }
    }

    /// Print each bin's index and spec filter before execution
    pub fn assignment(&mut self, partition: &Partition) -> io::Result<()> {
        let mut block = String::new();
        for bin in partition.bins() {
            if bin.is_empty() {
                block.push_str(&format!("WORKER {}: (no specs)\n", bin.index()));
            } else {
                block.push_str(&format!(
                    "WORKER {} [{} specs]: {}\n",
                    bin.index(),
                    bin.len(),
                    bin.filter()
                ));
            }
        }
        emit(&mut self.progress, &block)
    }

    /// Print the command each worker would run
    pub fn plan(&mut self, plan: &[(usize, Option<WorkerCommand>)]) -> io::Result<()> {
        let mut block = String::from("\nDry run, nothing executed:\n");
        for (index, command) in plan {
            match command {
                Some(command) => block.push_str(&format!("  worker {index}: {command}\n")),
                None => block.push_str(&format!("  worker {index}: skipped (no specs)\n")),
            }
        }
        emit(&mut self.progress, &block)
    }

    /// Print everything a finished worker captured
    pub fn worker_finished(&mut self, result: &WorkerResult) -> io::Result<()> {
        let mut block = format!("\n── {} ──\n", self.formatter.format_result(result));

        match &result.status {
            WorkerStatus::SpawnFailed { error } => push_section(&mut block, error),
            WorkerStatus::Panicked { message } => push_section(&mut block, message),
            _ => {}
        }
        push_section(&mut block, &result.stdout);
        push_section(&mut block, &result.stderr);

        emit(&mut self.progress, &block)
    }

    pub fn completed(&mut self) -> io::Result<()> {
        emit(&mut self.progress, &format!("\n{COMPLETED_MARKER}\n"))
    }

    /// Print the run summary. Without `fail_on_error` a failing run still
    /// exits 0, which the summary points out.
    pub fn summary(&mut self, summary: &RunSummary, fail_on_error: bool) -> io::Result<()> {
        let mut block = self.formatter.format_summary(summary);
        if !block.ends_with('\n') {
            block.push('\n');
        }
        emit(&mut self.out, &block)?;

        if !summary.is_all_passed() && !fail_on_error {
            let note = format!(
                "\nWorkers {:?} failed; exit status stays 0 (use --fail-on-error to change this)\n",
                summary.failed_bins()
            );
            if self.formatter.is_json() {
                emit(&mut self.progress, &note)?;
            } else {
                emit(&mut self.out, &note)?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> (W, P) {
        (self.out, self.progress)
    }
}

fn emit(sink: &mut impl Write, block: &str) -> io::Result<()> {
    sink.write_all(block.as_bytes())?;
    sink.flush()
}

fn push_section(block: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    block.push_str(text);
    if !text.ends_with('\n') {
        block.push('\n');
    }
}
