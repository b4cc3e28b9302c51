//! Worker result models
//!
//! Defines worker outcomes and the summary of a whole run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Runner exited with status 0
    Passed,
    /// Runner exited nonzero, or was killed by a signal (no exit code)
    Failed { exit_code: Option<i32> },
    /// Runner could not be started
    SpawnFailed { error: String },
    /// Empty bin, runner not invoked
    Skipped,
    /// The worker task itself aborted
    Panicked { message: String },
}

impl WorkerStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            WorkerStatus::Passed => "✓",
            WorkerStatus::Failed { .. } => "✗",
            WorkerStatus::SpawnFailed { .. } | WorkerStatus::Panicked { .. } => "!",
            WorkerStatus::Skipped => "○",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkerStatus::Passed | WorkerStatus::Skipped)
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Passed => write!(f, "PASS"),
            WorkerStatus::Failed {
                exit_code: Some(code),
            } => write!(f, "FAIL (exit {code})"),
            WorkerStatus::Failed { exit_code: None } => write!(f, "FAIL (terminated)"),
            WorkerStatus::SpawnFailed { .. } => write!(f, "SPAWN ERROR"),
            WorkerStatus::Skipped => write!(f, "SKIP"),
            WorkerStatus::Panicked { .. } => write!(f, "PANIC"),
        }
    }
}

/// Captured result of one worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub bin: usize,
    pub spec_count: usize,
    #[serde(flatten)]
    pub status: WorkerStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub stderr: String,
}

impl WorkerResult {
    pub fn skipped(bin: usize) -> Self {
        Self {
            bin,
            spec_count: 0,
            status: WorkerStatus::Skipped,
            duration_ms: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn spawn_failed(bin: usize, spec_count: usize, error: impl Into<String>) -> Self {
        Self {
            bin,
            spec_count,
            status: WorkerStatus::SpawnFailed {
                error: error.into(),
            },
            duration_ms: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn panicked(bin: usize, spec_count: usize, message: impl Into<String>) -> Self {
        Self {
            bin,
            spec_count,
            status: WorkerStatus::Panicked {
                message: message.into(),
            },
            duration_ms: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl fmt::Display for WorkerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Worker {} [{} specs] {} [{}ms]",
            self.status.symbol(),
            self.bin,
            self.spec_count,
            self.status,
            self.duration_ms
        )
    }
}

/// Summary of a whole parallel run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub results: Vec<WorkerResult>,
}

impl RunSummary {
    /// Build a summary; results are ordered by bin index
    pub fn new(
        started_at: DateTime<Utc>,
        total_duration_ms: u64,
        mut results: Vec<WorkerResult>,
    ) -> Self {
        results.sort_by_key(|r| r.bin);

        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.status == WorkerStatus::Passed)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == WorkerStatus::Skipped)
            .count();
        let failed = results.iter().filter(|r| !r.is_success()).count();

        Self {
            started_at,
            total,
            passed,
            failed,
            skipped,
            total_duration_ms,
            results,
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Whether the run should end with a failing exit status. Worker
    /// failures only count when `fail_on_error` is set.
    pub fn fails_run(&self, fail_on_error: bool) -> bool {
        fail_on_error && !self.is_all_passed()
    }

    pub fn failed_bins(&self) -> Vec<usize> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.bin)
            .collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        write!(
            f,
            "Workers: {} | Pass: {} | Fail: {} | Skip: {} | Duration: {}ms",
            self.total, self.passed, self.failed, self.skipped, self.total_duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(bin: usize, status: WorkerStatus) -> WorkerResult {
        WorkerResult {
            bin,
            spec_count: 2,
            status,
            duration_ms: 10,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_status_success() {
        assert!(WorkerStatus::Passed.is_success());
        assert!(WorkerStatus::Skipped.is_success());
        assert!(!WorkerStatus::Failed { exit_code: Some(1) }.is_success());
        assert!(!WorkerStatus::SpawnFailed {
            error: "not found".to_string()
        }
        .is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            WorkerStatus::Failed { exit_code: Some(3) }.to_string(),
            "FAIL (exit 3)"
        );
        assert_eq!(
            WorkerStatus::Failed { exit_code: None }.to_string(),
            "FAIL (terminated)"
        );
    }

    #[test]
    fn test_summary_counts_and_order() {
        let results = vec![
            finished(2, WorkerStatus::Failed { exit_code: Some(1) }),
            WorkerResult::skipped(3),
            finished(0, WorkerStatus::Passed),
            WorkerResult::spawn_failed(1, 2, "No such file or directory"),
        ];

        let summary = RunSummary::new(Utc::now(), 100, results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 2);
        assert!(!summary.is_all_passed());
        assert_eq!(summary.failed_bins(), vec![1, 2]);

        let bins: Vec<usize> = summary.results.iter().map(|r| r.bin).collect();
        assert_eq!(bins, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_failed_worker_fails_run_only_when_requested() {
        let summary = RunSummary::new(
            Utc::now(),
            10,
            vec![
                finished(0, WorkerStatus::Passed),
                finished(1, WorkerStatus::Failed { exit_code: Some(1) }),
            ],
        );

        assert!(!summary.fails_run(false));
        assert!(summary.fails_run(true));
    }

    #[test]
    fn test_passing_run_never_fails() {
        let summary = RunSummary::new(
            Utc::now(),
            10,
            vec![finished(0, WorkerStatus::Passed), WorkerResult::skipped(1)],
        );

        assert!(!summary.fails_run(false));
        assert!(!summary.fails_run(true));
    }

    #[test]
    fn test_summary_all_skipped_is_success() {
        let summary = RunSummary::new(
            Utc::now(),
            0,
            vec![WorkerResult::skipped(0), WorkerResult::skipped(1)],
        );
        assert!(summary.is_all_passed());
    }

    #[test]
    fn test_result_json_shape() {
        let result = finished(1, WorkerStatus::Failed { exit_code: Some(2) });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["bin"], 1);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["exit_code"], 2);
        assert!(json.get("stdout").is_none());
    }
}
