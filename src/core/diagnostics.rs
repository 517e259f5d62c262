//! Diagnostic Provider
//!
//! Turns an analysis into diagnostics anchored on source spans, ready for
//! the CLI printer and the LSP publisher.

use serde::Serialize;

use crate::core::document::{Analysis, ComposeDocument};
use crate::core::position::{char_to_byte_column, locate_path, SourceSpan};
use crate::parser::ParseError;
use crate::validation::{Diagnostic, Severity};

/// A diagnostic with its resolved place in the text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedDiagnostic {
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
    /// 0-based line
    pub line: usize,
    /// 0-based start column, in bytes
    pub column: usize,
    #[serde(skip)]
    pub end_column: usize,
}

/// Produces located diagnostics for documents
#[derive(Debug, Clone, Default)]
pub struct DiagnosticProvider {
    /// Drop warning-severity diagnostics from the output
    pub hide_warnings: bool,
}

impl DiagnosticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hide_warnings(hide_warnings: bool) -> Self {
        Self { hide_warnings }
    }

    /// Analyse a document and locate every finding.
    ///
    /// A parse failure becomes a single error at the parser's position.
    pub fn diagnose(&self, document: &ComposeDocument) -> (Analysis, Vec<LocatedDiagnostic>) {
        let analysis = document.analyze();
        let located = self.locate(&document.text, &analysis);
        (analysis, located)
    }

    pub fn locate(&self, text: &str, analysis: &Analysis) -> Vec<LocatedDiagnostic> {
        match analysis {
            Analysis::ParseFailed(err) => {
                let (line, column) = err
                    .location()
                    .map(|(line, column)| (line.saturating_sub(1), column.saturating_sub(1)))
                    .unwrap_or((0, 0));
                // libyaml counts characters, serde_json counts bytes
                let column = match err {
                    ParseError::Yaml { .. } => {
                        char_to_byte_column(text.lines().nth(line).unwrap_or(""), column)
                    }
                    ParseError::Json { .. } => column,
                };
                vec![LocatedDiagnostic {
                    diagnostic: Diagnostic {
                        severity: Severity::Error,
                        message: err.to_string(),
                        path: None,
                    },
                    line,
                    column,
                    end_column: column + 1,
                }]
            }
            Analysis::Invalid(result) | Analysis::Valid(result) => result
                .diagnostics
                .iter()
                .filter(|d| !(self.hide_warnings && d.severity == Severity::Warning))
                .map(|d| {
                    let span = d
                        .path
                        .as_deref()
                        .and_then(|path| locate_path(text, path))
                        .unwrap_or_else(|| first_line_span(text));
                    LocatedDiagnostic {
                        diagnostic: d.clone(),
                        line: span.line,
                        column: span.start_col,
                        end_column: span.end_col,
                    }
                })
                .collect(),
        }
    }
}

/// Whole first line, used when a diagnostic has no locatable path
fn first_line_span(text: &str) -> SourceSpan {
    let width = text.lines().next().map(str::len).unwrap_or(0);
    SourceSpan::new(0, 0, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Format;

    #[test]
    fn test_located_paths() {
        let doc = ComposeDocument::new(
            "services:\n  web:\n    image: nginx\n    restart: sometimes\n",
            Format::Yaml,
        );
        let (analysis, located) = DiagnosticProvider::new().diagnose(&doc);
        assert!(!analysis.is_valid());
        assert_eq!(located.len(), 1);
        assert_eq!((located[0].line, located[0].column, located[0].end_column), (3, 4, 11));
    }

    #[test]
    fn test_parse_failure_position() {
        let doc = ComposeDocument::new("services:\n  web: [\n", Format::Yaml);
        let (analysis, located) = DiagnosticProvider::new().diagnose(&doc);
        assert!(matches!(analysis, Analysis::ParseFailed(_)));
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].diagnostic.severity, Severity::Error);
        assert!(located[0].diagnostic.message.starts_with("YAML syntax error"));
    }

    #[test]
    fn test_yaml_parse_failure_column_in_bytes() {
        // the unexpected `:` sits after a two-byte character
        let doc = ComposeDocument::new("services:\n  w\u{e9}b: a: b\n", Format::Yaml);
        let (analysis, located) = DiagnosticProvider::new().diagnose(&doc);
        let Analysis::ParseFailed(err) = analysis else {
            panic!("expected a parse failure");
        };
        let (line, char_col) = err.location().expect("location");
        let text_line = doc.text.lines().nth(line - 1).expect("line");
        assert_eq!(located[0].line, line - 1);
        assert_eq!(located[0].column, char_to_byte_column(text_line, char_col - 1));
    }

    #[test]
    fn test_dotted_service_name_is_located() {
        let doc = ComposeDocument::new(
            "services:\n  api:\n    image: a\n  api.v1:\n    image: b\n    restart: sometimes\n",
            Format::Yaml,
        );
        let (_, located) = DiagnosticProvider::new().diagnose(&doc);
        assert_eq!(located.len(), 1);
        assert_eq!(
            located[0].diagnostic.path.as_deref(),
            Some("services.api.v1.restart")
        );
        assert_eq!((located[0].line, located[0].column, located[0].end_column), (5, 4, 11));
    }

    #[test]
    fn test_pathless_diagnostic_anchors_first_line() {
        let doc = ComposeDocument::new(
            "services:\n  a:\n    image: x\n    depends_on: [b]\n  b:\n    image: x\n    depends_on: [a]\n",
            Format::Yaml,
        );
        let (_, located) = DiagnosticProvider::new().diagnose(&doc);
        assert_eq!(located.len(), 2);
        assert!(located.iter().all(|d| d.line == 0 && d.end_column == 9));
    }

    #[test]
    fn test_hide_warnings() {
        let doc = ComposeDocument::new("version: '3'\nservices:\n  web:\n    image: nginx\n", Format::Yaml);
        let (_, shown) = DiagnosticProvider::new().diagnose(&doc);
        assert_eq!(shown.len(), 1);
        let (_, hidden) = DiagnosticProvider::with_hide_warnings(true).diagnose(&doc);
        assert!(hidden.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let located = LocatedDiagnostic {
            diagnostic: Diagnostic {
                severity: Severity::Error,
                message: "m".to_string(),
                path: Some("services".to_string()),
            },
            line: 2,
            column: 0,
            end_column: 8,
        };
        let json = serde_json::to_value(&located).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"severity": "error", "message": "m", "path": "services", "line": 2, "column": 0})
        );
    }
}
