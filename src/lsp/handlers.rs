use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::core::position::{byte_column, utf16_column};
use crate::core::{service_spans, LocatedDiagnostic};
use crate::lsp::backend::Backend;
use crate::parser::{parse_document, Value};
use crate::validation::keys::{SERVICE_KEYS, TOP_LEVEL_KEYS};
use crate::validation::Severity;

/// Trait for handling completion requests
#[tower_lsp::async_trait]
pub trait HandleCompletion {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>>;
}

/// Trait for handling document symbols
#[tower_lsp::async_trait]
pub trait HandleDocumentSymbol {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>>;
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn publish_diagnostics(&self, uri: Url);
    fn create_lsp_diagnostic(&self, located: LocatedDiagnostic, content: &str) -> Diagnostic;
}

/// Which key set applies at a cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyContext {
    TopLevel,
    Service(String),
    None,
}

/// Work out the key context from the text layout around `line`.
///
/// `character` is an LSP (UTF-16) column. Text-based so it keeps working
/// while the document does not parse.
pub fn key_context(content: &str, line: usize, character: usize) -> KeyContext {
    let current = content.lines().nth(line).unwrap_or("");
    let before_cursor = &current[..byte_column(current, character)];
    let typed = before_cursor.trim_start();

    // Only complete while typing a key, not a value
    if typed.contains(':') || typed.starts_with('-') || typed.starts_with('#') {
        return KeyContext::None;
    }

    let indent = before_cursor.len() - typed.len();
    if indent == 0 {
        return KeyContext::TopLevel;
    }

    for (name, span, last) in service_spans(content) {
        if line > span.line && line <= last + 1 && indent > span.start_col {
            return KeyContext::Service(name);
        }
    }

    KeyContext::None
}

#[tower_lsp::async_trait]
impl HandleCompletion for Backend {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;

        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        let (keys, detail): (&[&str], String) =
            match key_context(doc_state.content(), pos.line as usize, pos.character as usize) {
                KeyContext::TopLevel => (TOP_LEVEL_KEYS, "Compose top-level key".to_string()),
                KeyContext::Service(name) => (SERVICE_KEYS, format!("Key of service \"{}\"", name)),
                KeyContext::None => return Ok(None),
            };

        let completions: Vec<CompletionItem> = keys
            .iter()
            .map(|key| CompletionItem {
                label: key.to_string(),
                kind: Some(CompletionItemKind::PROPERTY),
                detail: Some(detail.clone()),
                insert_text: Some(format!("{}: ", key)),
                tags: (*key == "version").then(|| vec![CompletionItemTag::DEPRECATED]),
                ..Default::default()
            })
            .collect();

        Ok(Some(CompletionResponse::Array(completions)))
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSymbol for Backend {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;

        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        let content = doc_state.content();
        // Symbol details are best effort; layout alone is enough for names
        let parsed = parse_document(content, doc_state.document.format).ok();
        let lines: Vec<&str> = content.lines().collect();

        let symbols = service_spans(content)
            .into_iter()
            .map(|(name, span, last)| {
                let detail = parsed
                    .as_ref()
                    .and_then(|doc| doc.get("services"))
                    .and_then(|services| services.get(&name))
                    .and_then(service_detail);
                let key_line = lines.get(span.line).copied().unwrap_or("");
                let last_line = lines.get(last).copied().unwrap_or("");

                DocumentSymbol {
                    name,
                    detail,
                    kind: SymbolKind::MODULE,
                    tags: None,
                    #[allow(deprecated)]
                    deprecated: None,
                    range: Range::new(
                        Position::new(span.line as u32, utf16_column(key_line, span.start_col)),
                        Position::new(last as u32, utf16_column(last_line, last_line.len())),
                    ),
                    selection_range: Range::new(
                        Position::new(span.line as u32, utf16_column(key_line, span.start_col)),
                        Position::new(span.line as u32, utf16_column(key_line, span.end_col)),
                    ),
                    children: None,
                }
            })
            .collect();

        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }
}

/// `image` if set, else the build context
fn service_detail(service: &Value) -> Option<String> {
    if let Some(image) = service.get("image").filter(|v| v.is_truthy()) {
        return Some(image.to_display_string());
    }
    match service.get("build")? {
        Value::String(context) => Some(format!("build: {}", context)),
        build => build
            .get("context")
            .map(|context| format!("build: {}", context)),
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Publish diagnostics for a document
    async fn publish_diagnostics(&self, uri: Url) {
        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return,
        };

        let (_, located) = self.provider.diagnose(&doc_state.document);
        let version = doc_state.version;
        let diagnostics: Vec<Diagnostic> = located
            .into_iter()
            .map(|d| self.create_lsp_diagnostic(d, doc_state.content()))
            .collect();
        drop(docs);

        log::debug!("Publishing {} diagnostics for {}", diagnostics.len(), uri);
        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    fn create_lsp_diagnostic(&self, located: LocatedDiagnostic, content: &str) -> Diagnostic {
        to_lsp_diagnostic(located, content)
    }
}

/// Convert to an LSP diagnostic; byte columns become UTF-16 columns of
/// the matching line in `content`
pub fn to_lsp_diagnostic(located: LocatedDiagnostic, content: &str) -> Diagnostic {
    let severity = match located.diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };
    let line = content.lines().nth(located.line).unwrap_or("");

    Diagnostic::new(
        Range::new(
            Position::new(located.line as u32, utf16_column(line, located.column)),
            Position::new(located.line as u32, utf16_column(line, located.end_column)),
        ),
        Some(severity),
        None,
        Some("compose-ls".to_string()),
        located.diagnostic.message,
        None,
        None,
    )
}
