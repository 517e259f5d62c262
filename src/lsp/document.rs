use tower_lsp::lsp_types::Url;

use crate::core::ComposeDocument;
use crate::parser::Format;

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub document: ComposeDocument,
    pub version: Option<i32>,
}

impl DocumentState {
    pub fn new(uri: &Url, content: String, language_id: Option<&str>, version: Option<i32>) -> Self {
        Self {
            document: ComposeDocument::new(content, detect_format(uri, language_id)),
            version,
        }
    }

    pub fn content(&self) -> &str {
        &self.document.text
    }
}

/// JSON when the client says so or the file ends in `.json`, else YAML
pub fn detect_format(uri: &Url, language_id: Option<&str>) -> Format {
    match language_id {
        Some("json") | Some("jsonc") => Format::Json,
        Some("yaml") | Some("dockercompose") => Format::Yaml,
        _ => Format::from_path(std::path::Path::new(uri.path())),
    }
}
