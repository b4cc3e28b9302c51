//! Output formatting and console reporting

mod formatter;
mod reporter;

pub use formatter::{OutputFormat, ResultFormatter};
pub use reporter::OutputReporter;
