//! Output formatters for worker results
//!
//! Provides text and JSON renderings of a run summary.

use std::io::{self, IsTerminal};

use crate::models::{RunSummary, WorkerResult, WorkerStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    /// Colours are enabled only when stdout is a terminal
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: io::stdout().is_terminal(),
        }
    }

    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    pub fn no_color(self) -> Self {
        self.colorize(false)
    }

    pub fn is_json(&self) -> bool {
        self.format.is_json()
    }

    /// Status word with its symbol, coloured when enabled
    pub fn format_status(&self, status: &WorkerStatus) -> String {
        let plain = format!("{} {}", status.symbol(), status);
        if !self.colorize {
            return plain;
        }
        let color = match status {
            WorkerStatus::Passed => "32",
            WorkerStatus::Skipped => "33",
            _ => "31",
        };
        format!("\x1b[{color}m{plain}\x1b[0m")
    }

    /// One-line description of a finished worker
    pub fn format_result(&self, result: &WorkerResult) -> String {
        format!(
            "Worker {:2} [{:3} specs] {} [{:>7}ms]",
            result.bin,
            result.spec_count,
            self.format_status(&result.status),
            result.duration_ms
        )
    }

    /// Format the run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Text => self.format_summary_text(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
        }
    }

    fn format_summary_text(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Run Summary ({} workers, started {})\n",
            summary.total,
            summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        for result in &summary.results {
            output.push_str(&format!(" {}\n", self.format_result(result)));
        }

        output.push_str(" ───────────────────────────────────────────────────────────\n");

        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!(
            " Pass: {} | Fail: {} | Skip: {} | Duration: {}ms\n",
            summary.passed, fail_str, summary.skipped, summary.total_duration_ms
        ));

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}
