//! Parallel execution coordinator
//!
//! Spawns one task per bin, all at once, and joins every one of them.
//! Failures stay inside their `WorkerResult`; nothing is cancelled early.

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{error, info};

use super::worker::{Worker, WorkerCommand};
use crate::config::{RunConfig, RunnerConfig};
use crate::models::{RunSummary, WorkerResult};
use crate::partition::Partition;
use crate::utils::timer::Timer;

pub struct Coordinator {
    runner: Arc<RunnerConfig>,
    skip_empty_bins: bool,
}

impl Coordinator {
    pub fn new(runner: RunnerConfig) -> Self {
        Self {
            runner: Arc::new(runner),
            skip_empty_bins: true,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.runner.clone()).with_skip_empty_bins(config.skip_empty_bins)
    }

    pub fn with_skip_empty_bins(mut self, skip: bool) -> Self {
        self.skip_empty_bins = skip;
        self
    }

    /// Commands each bin would run, without running them
    pub fn plan(&self, partition: &Partition) -> Vec<(usize, Option<WorkerCommand>)> {
        partition
            .bins()
            .iter()
            .map(|bin| {
                let worker = Worker::new(bin.clone(), self.runner.clone(), self.skip_empty_bins);
                (bin.index(), worker.command())
            })
            .collect()
    }

    /// Run every bin concurrently.
    ///
    /// `on_complete` sees each result as soon as its worker finishes, in
    /// completion order. The returned summary exists only once all workers
    /// have been joined.
    pub async fn run<F>(&self, partition: Partition, mut on_complete: F) -> RunSummary
    where
        F: FnMut(&WorkerResult),
    {
        let started_at = Utc::now();
        let timer = Timer::start("parallel run");

        let mut pending: FuturesUnordered<_> = partition
            .into_bins()
            .into_iter()
            .map(|bin| {
                let index = bin.index();
                let spec_count = bin.len();
                let worker = Worker::new(bin, self.runner.clone(), self.skip_empty_bins);
                tokio::spawn(worker.run()).map(move |joined| match joined {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Worker {} aborted: {}", index, e);
                        WorkerResult::panicked(index, spec_count, e.to_string())
                    }
                })
            })
            .collect();

        info!("Started {} workers", pending.len());

        let mut results = Vec::with_capacity(pending.len());
        while let Some(result) = pending.next().await {
            on_complete(&result);
            results.push(result);
        }

        let summary = RunSummary::new(started_at, timer.stop(), results);
        info!(
            "All {} workers joined in {}ms - Pass: {} | Fail: {} | Skip: {}",
            summary.total,
            summary.total_duration_ms,
            summary.passed,
            summary.failed,
            summary.skipped
        );
        summary
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::discovery::SpecFile;
    use crate::models::WorkerStatus;
    use std::time::Instant;
    use tempfile::{tempdir, TempDir};

    /// Stand-in runner run through `sh`: echoes its arguments, fails for specs named
    /// `*fail*`, sleeps for specs named `*slow*`.
    const STUB_RUNNER: &str = r#"case "$*" in *slow*) sleep 1 ;; esac
echo "runner args: $*"
case "$*" in *fail*) echo "spec failed" >&2; exit 3 ;; esac
exit 0
"#;

    fn stub_runner() -> (TempDir, RunnerConfig) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake-cypress.sh");
        std::fs::write(&path, STUB_RUNNER).unwrap();

        let runner = RunnerConfig {
            command: "sh".to_string(),
            command_args: vec![path.to_string_lossy().into_owned()],
            ..Default::default()
        };
        (dir, runner)
    }

    fn partition(names: &[&str], workers: usize) -> Partition {
        let specs = names.iter().map(|n| SpecFile::new(*n)).collect();
        Partition::round_robin(specs, workers).unwrap()
    }

    #[tokio::test]
    async fn test_all_workers_pass() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner);

        let mut seen = Vec::new();
        let summary = coordinator
            .run(partition(&["a.spec.ts", "b.spec.ts", "c.spec.ts"], 2), |r| {
                seen.push(r.bin)
            })
            .await;

        seen.sort();
        assert_eq!(seen, vec![0, 1]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 2);
        assert!(summary.is_all_passed());
        assert!(summary.results[0]
            .stdout
            .contains("--config-file docker.cypress.config.ts --spec 'a.spec.ts,c.spec.ts'"));
        assert!(summary.results[1].stdout.contains("--spec 'b.spec.ts'"));
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner);

        let summary = coordinator
            .run(
                partition(&["fail.spec.ts", "ok.spec.ts", "other.spec.ts"], 3),
                |_| {},
            )
            .await;

        assert_eq!(summary.total, 3);
        assert_eq!(
            summary.results[0].status,
            WorkerStatus::Failed { exit_code: Some(3) }
        );
        assert!(summary.results[0].stderr.contains("spec failed"));
        assert_eq!(summary.results[1].status, WorkerStatus::Passed);
        assert_eq!(summary.results[2].status, WorkerStatus::Passed);
        assert!(summary.results[2].stdout.contains("other.spec.ts"));
        assert_eq!(summary.failed_bins(), vec![0]);
    }

    #[tokio::test]
    async fn test_empty_bins_are_skipped() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner);

        let summary = coordinator
            .run(partition(&["a.spec.ts", "b.spec.ts"], 3), |_| {})
            .await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.results[2].status, WorkerStatus::Skipped);
        assert!(summary.is_all_passed());
    }

    #[tokio::test]
    async fn test_empty_bins_invoked_when_not_skipping() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner).with_skip_empty_bins(false);

        let summary = coordinator.run(partition(&[], 2), |_| {}).await;

        assert_eq!(summary.passed, 2);
        assert!(summary.results[0].stdout.contains("--spec ''"));
    }

    #[tokio::test]
    async fn test_no_specs_completes() {
        let coordinator = Coordinator::new(RunnerConfig::default());

        let mut calls = 0;
        let summary = coordinator.run(partition(&[], 2), |_| calls += 1).await;

        assert_eq!(calls, 2);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.skipped, 2);
        assert!(summary.is_all_passed());
    }

    #[tokio::test]
    async fn test_spawn_failure_does_not_stop_siblings() {
        let coordinator = Coordinator::new(RunnerConfig {
            command: "/nonexistent/cypress".to_string(),
            ..Default::default()
        });

        let summary = coordinator
            .run(partition(&["a.spec.ts", "b.spec.ts"], 2), |_| {})
            .await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 2);
        assert!(matches!(
            summary.results[1].status,
            WorkerStatus::SpawnFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_workers_run_concurrently() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner);

        let start = Instant::now();
        let summary = coordinator
            .run(partition(&["slow1.spec.ts", "slow2.spec.ts"], 2), |_| {})
            .await;

        assert_eq!(summary.passed, 2);
        // Two one-second workers in sequence would need at least two seconds.
        assert!(start.elapsed().as_millis() < 1900);
    }

    #[tokio::test]
    async fn test_completion_order_follows_finish_time() {
        let (_dir, runner) = stub_runner();
        let coordinator = Coordinator::new(runner);

        let mut order = Vec::new();
        coordinator
            .run(partition(&["slow.spec.ts", "fast.spec.ts"], 2), |r| {
                order.push(r.bin)
            })
            .await;

        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_plan() {
        let coordinator = Coordinator::from_config(&RunConfig::default());
        let plan = coordinator.plan(&partition(&["a.spec.ts"], 2));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].0, 0);
        assert!(plan[0].1.is_some());
        assert!(plan[1].1.is_none());
    }
}
