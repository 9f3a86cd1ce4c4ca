//! Listener capability and accept loop

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::handler::handle_connection;
use crate::server::ServerCommand;

/// Source of accepted connections
///
/// Accepts one connection, yielding a byte-stream handle and the peer
/// address as a string.
pub trait Listener {
    /// Byte-stream handle for one connection
    type Stream: AsyncRead + AsyncWrite + Send + 'static;

    /// Accept the next connection
    fn accept(&self) -> impl Future<Output = io::Result<(Self::Stream, String)>> + Send;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, String)>> + Send {
        async move {
            let (stream, addr) = TcpListener::accept(self).await?;
            Ok((stream, addr.to_string()))
        }
    }
}

/// Accept connections forever, spawning a handler for each
///
/// Accept errors are logged and do not stop the loop.
pub async fn serve<L: Listener>(listener: L, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("New connection from {}", peer);
                let cmd_tx = cmd_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
