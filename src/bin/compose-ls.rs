use std::thread;
use std::time::Duration;

use anyhow::Result;
use compose_language_server::lsp::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    // Under the integration test, exit after a short delay so the test can read stdout to EOF.
    if std::env::var("COMPOSE_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    serve().await
}
