//! # Processing Report
//!
//! Structured diagnostics collected while a staging directory is processed.
//! Parse-level anomalies degrade to missing data instead of aborting; each
//! one is recorded here and mirrored to the `log` facade so callers and tests
//! can assert on them instead of scraping console output.

use serde::Serialize;
use std::fmt;

/// How serious a recorded diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Expected fallback or informational note.
    Info,
    /// Best-effort repair or data loss; output is still usable.
    Warning,
}

/// One recorded anomaly.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Diagnostic severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Diagnostics accumulated over one pipeline invocation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Report {
    /// Recorded diagnostics, in the order they occurred.
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational note.
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Info,
            message,
        });
    }

    /// Record a non-fatal anomaly.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    /// Whether any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    /// Number of recorded warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Whether any diagnostic message contains the given fragment.
    ///
    /// Convenience for tests asserting on anomaly classes.
    pub fn mentions(&self, fragment: &str) -> bool {
        self.diagnostics.iter().any(|d| d.message.contains(fragment))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return writeln!(f, "processing report: clean");
        }
        writeln!(
            f,
            "processing report: {} diagnostics ({} warnings)",
            self.diagnostics.len(),
            self.warning_count()
        )?;
        for diagnostic in &self.diagnostics {
            let tag = match diagnostic.severity {
                Severity::Info => "INFO",
                Severity::Warning => "WARN",
            };
            writeln!(f, "[{tag}] {}", diagnostic.message)?;
        }
        Ok(())
    }
}
