//! Document Analysis
//!
//! One text buffer run through parse and validation.

use crate::parser::{parse_document, Format, ParseError};
use crate::validation::{validate, ValidationResult};

/// Outcome of analysing a document. The three states are exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// The text could not be decoded; carries the parser's error
    ParseFailed(ParseError),
    /// Parsed, with at least one error-severity diagnostic
    Invalid(ValidationResult),
    /// Parsed, possibly with warnings
    Valid(ValidationResult),
}

impl Analysis {
    pub fn is_valid(&self) -> bool {
        matches!(self, Analysis::Valid(_))
    }

    /// Validation diagnostics, empty when parsing failed
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Analysis::ParseFailed(_) => None,
            Analysis::Invalid(result) | Analysis::Valid(result) => Some(result),
        }
    }
}

/// A Compose document held as text
#[derive(Debug, Clone)]
pub struct ComposeDocument {
    pub text: String,
    pub format: Format,
}

impl ComposeDocument {
    pub fn new(text: impl Into<String>, format: Format) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Parse and validate the current text
    pub fn analyze(&self) -> Analysis {
        match parse_document(&self.text, self.format) {
            Err(err) => Analysis::ParseFailed(err),
            Ok(value) => {
                let result = validate(&value);
                if result.is_valid() {
                    Analysis::Valid(result)
                } else {
                    Analysis::Invalid(result)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_outcomes() {
        let broken = ComposeDocument::new("services: [", Format::Yaml);
        assert!(matches!(broken.analyze(), Analysis::ParseFailed(_)));

        let invalid = ComposeDocument::new("services:\n  web: {}\n", Format::Yaml);
        assert!(matches!(invalid.analyze(), Analysis::Invalid(_)));

        let valid = ComposeDocument::new("version: '3'\nservices:\n  web:\n    image: nginx\n", Format::Yaml);
        let analysis = valid.analyze();
        assert!(analysis.is_valid());
        assert_eq!(analysis.validation().map(|r| r.warning_count()), Some(1));
    }

    #[test]
    fn test_empty_text_is_missing_services() {
        let analysis = ComposeDocument::new("", Format::Yaml).analyze();
        let result = analysis.validation().expect("parsed");
        assert_eq!(result.diagnostics[0].message, "Missing required services key");
    }
}
