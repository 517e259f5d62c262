use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::core::DiagnosticProvider;
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleCompletion, HandleDiagnostics, HandleDocumentSymbol};
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub provider: DiagnosticProvider,
    pub config: Config,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            provider: DiagnosticProvider::with_hide_warnings(config.hide_warnings),
            config,
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: None,
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "compose-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("compose-ls initialized");
        if let Some(path) = &self.config.project_config_path {
            log::info!("Project config: {}", path.display());
        }
        self.client
            .log_message(MessageType::INFO, "compose-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        log::info!("compose-ls shutting down");
        Ok(())
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> tower_lsp::jsonrpc::Result<Option<CompletionResponse>> {
        self.handle_completion(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> tower_lsp::jsonrpc::Result<Option<DocumentSymbolResponse>> {
        self.handle_document_symbol(params).await
    }

    // Store opened documents for diagnostics
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        let uri = item.uri.clone();
        let doc_state = DocumentState::new(
            &item.uri,
            item.text,
            Some(item.language_id.as_str()),
            Some(item.version),
        );
        log::debug!("Opened {} as {:?}", uri, doc_state.document.format);

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), doc_state);
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.lock().await;
            match docs.get_mut(&uri) {
                Some(state) => {
                    state.document.text = change.text;
                    state.version = Some(version);
                }
                None => {
                    docs.insert(
                        uri.clone(),
                        DocumentState::new(&uri, change.text, None, Some(version)),
                    );
                }
            }
            drop(docs); // Release the lock before calling publish_diagnostics

            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        // Clear stale diagnostics for the closed file
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}
