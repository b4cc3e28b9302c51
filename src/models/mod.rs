//! Data models for parallel runs
//!
//! Results flow from workers back to the coordinator by value.

mod worker_result;

pub use worker_result::{RunSummary, WorkerResult, WorkerStatus};
