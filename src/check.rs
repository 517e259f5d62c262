//! Command-line checking
//!
//! Runs documents through the diagnostic provider and renders the findings
//! for `compose-check`.

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::{Config, OutputFormat};
use crate::core::{Analysis, ComposeDocument, DiagnosticProvider, LocatedDiagnostic};
use crate::validation::Severity;

/// Exit status when every document is acceptable
pub const EXIT_OK: i32 = 0;
/// Exit status when a document has blocking findings
pub const EXIT_INVALID: i32 = 1;
/// Exit status when a document could not be read or parsed
pub const EXIT_FAILURE: i32 = 2;

/// Outcome of a single input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    Invalid,
    ParseError,
}

/// Findings for one input, in the shape printed as JSON
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub status: Status,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<LocatedDiagnostic>,
}

impl FileReport {
    /// Analyse one document
    pub fn check(file: impl Into<String>, document: &ComposeDocument, provider: &DiagnosticProvider) -> Self {
        let (analysis, diagnostics) = provider.diagnose(document);
        let (status, errors, warnings) = match &analysis {
            Analysis::ParseFailed(_) => (Status::ParseError, 1, 0),
            Analysis::Invalid(result) => (Status::Invalid, result.error_count(), result.warning_count()),
            Analysis::Valid(result) => (Status::Valid, 0, result.warning_count()),
        };

        Self {
            file: file.into(),
            status,
            errors,
            warnings,
            diagnostics,
        }
    }

    /// A report for an input that could not be read at all
    pub fn unreadable(file: impl Into<String>, message: String) -> Self {
        Self {
            file: file.into(),
            status: Status::ParseError,
            errors: 1,
            warnings: 0,
            diagnostics: vec![LocatedDiagnostic {
                diagnostic: crate::validation::Diagnostic {
                    severity: Severity::Error,
                    message,
                    path: None,
                },
                line: 0,
                column: 0,
                end_column: 0,
            }],
        }
    }

    /// Whether this report should fail the run
    pub fn fails(&self, fail_on_warnings: bool) -> bool {
        self.status != Status::Valid || (fail_on_warnings && self.warnings > 0)
    }
}

/// Process exit status for a set of reports
pub fn exit_code(reports: &[FileReport], fail_on_warnings: bool) -> i32 {
    if reports.iter().any(|r| r.status == Status::ParseError) {
        EXIT_FAILURE
    } else if reports.iter().any(|r| r.fails(fail_on_warnings)) {
        EXIT_INVALID
    } else {
        EXIT_OK
    }
}

/// Render reports in the configured output format
pub fn render(reports: &[FileReport], config: &Config) -> anyhow::Result<String> {
    match config.format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
    }
}

/// `file:line:col: severity: message` lines followed by a summary per file
pub fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        for located in &report.diagnostics {
            let severity = match located.diagnostic.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            let _ = write!(
                out,
                "{}:{}:{}: {}: {}",
                report.file,
                located.line + 1,
                located.column + 1,
                severity,
                located.diagnostic.message
            );
            if let Some(path) = &located.diagnostic.path {
                let _ = write!(out, " [{}]", path);
            }
            out.push('\n');
        }

        let _ = match report.status {
            Status::Valid if report.warnings == 0 => writeln!(out, "{}: valid", report.file),
            Status::Valid => writeln!(out, "{}: valid ({} warnings)", report.file, report.warnings),
            Status::Invalid => writeln!(
                out,
                "{}: {} errors, {} warnings",
                report.file, report.errors, report.warnings
            ),
            Status::ParseError => writeln!(out, "{}: could not be parsed", report.file),
        };
    }
    out
}
