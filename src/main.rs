//! Multi-room chat server - Entry Point
//!
//! Starts the TCP listener and ChatServer actor, accepting connections.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oss_chat::{serve, AppError, ChatServer, Cli, ServerConfig};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=oss_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oss_chat=info")),
        )
        .init();

    let config = ServerConfig::from(Cli::parse());

    // Start TCP listener
    let listener = TcpListener::bind(&config.addr).await?;
    info!("Chat server listening on {}", listener.local_addr()?);

    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = ChatServer::new(cmd_rx, &config);
    tokio::spawn(server.run());

    tokio::select! {
        _ = serve(listener, cmd_tx) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
