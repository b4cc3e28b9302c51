//! Test execution engine
//!
//! Runs one external runner process per bin, concurrently.

mod coordinator;
mod worker;

pub use coordinator::Coordinator;
pub use worker::WorkerCommand;
