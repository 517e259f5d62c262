use thiserror::Error;

/// Failure to decode document text into a value tree.
///
/// Line and column are 1-based when the underlying parser reports them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("YAML syntax error: {message}")]
    Yaml {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    #[error("JSON syntax error: {message}")]
    Json {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
}

impl ParseError {
    /// 1-based (line, column) of the failure, if known
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Yaml { line, column, .. } | ParseError::Json { line, column, .. } => {
                Some(((*line)?, column.unwrap_or(1)))
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Yaml { message, .. } | ParseError::Json { message, .. } => message,
        }
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        ParseError::Yaml {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json reports line 0 when no position applies
        let line = (err.line() > 0).then_some(err.line());
        ParseError::Json {
            message: err.to_string(),
            line,
            column: line.map(|_| err.column()),
        }
    }
}
