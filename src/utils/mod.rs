//! Shared helpers for logging and timing

pub mod logger;
pub mod timer;
