//! Inventory server command.

use anyhow::Result;

use boxfactory::factory::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    port: u16,
    in_memory: bool,
    origin: Option<String>,
    open: bool,
) -> Result<()> {
    // Open the search page shortly after startup so the server has bound
    if open {
        let url = format!("http://localhost:{}/boxes", port);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(ServerConfig {
        port,
        in_memory,
        allowed_origin: origin,
    })
    .await
}
