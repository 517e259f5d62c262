use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::config::init_logging;
use crate::lsp::backend::Backend;
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);
    log::info!(
        "Starting compose-ls {} (hide_warnings={})",
        env!("CARGO_PKG_VERSION"),
        config.hide_warnings
    );

    let (service, socket) = LspService::build(move |client| Backend::new(client, config)).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
