//! Connection handler
//!
//! Handles individual client connections: frames inbound bytes into
//! lines, forwards them to the ChatServer, and writes queued replies
//! back to the socket.

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tracing::{debug, info};

use crate::codec::LineCodec;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::server::{DisconnectReason, ServerCommand};
use crate::types::ClientId;

/// Capacity of each client's outbound queue
pub const OUTBOUND_QUEUE_SIZE: usize = 32;

/// Handle an accepted connection
///
/// Registers with the ChatServer, pumps lines until the peer closes,
/// a read fails or the writer gives up, then deregisters.
pub async fn handle_connection<S>(
    stream: S,
    peer: String,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let client_id = ClientId::new();
    debug!("Client {} assigned to {}", client_id, peer);

    let (reader, writer) = tokio::io::split(stream);

    // Create channel for server -> client messages
    let (msg_tx, msg_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    // Register with ChatServer
    cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            peer,
            sender: msg_tx,
        })
        .await
        .map_err(|_| AppError::ChannelSend)?;

    let mut write_task = tokio::spawn(write_loop(writer, msg_rx, client_id));

    let mut lines = FramedRead::new(reader, LineCodec::new());
    let read_loop = async {
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    if cmd_tx
                        .send(ServerCommand::Line { client_id, line })
                        .await
                        .is_err()
                    {
                        debug!("Server closed, ending read loop for {}", client_id);
                        return DisconnectReason::Closed;
                    }
                }
                Err(e) => return DisconnectReason::Error(e.to_string()),
            }
        }
        DisconnectReason::Closed
    };

    // Wait for either side to finish
    let reason = tokio::select! {
        reason = read_loop => reason,
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            DisconnectReason::Closed
        }
    };

    // The writer drains what is queued and exits once the server drops the user
    let _ = cmd_tx
        .send(ServerCommand::Disconnect { client_id, reason })
        .await;

    info!("Client {} connection closed", client_id);

    Ok(())
}

/// Write queued messages to the socket, one write per message
async fn write_loop<W>(
    mut writer: WriteHalf<W>,
    mut msg_rx: mpsc::Receiver<ServerMessage>,
    client_id: ClientId,
) where
    W: AsyncWrite,
{
    while let Some(msg) = msg_rx.recv().await {
        if let Err(e) = writer.write_all(msg.to_string().as_bytes()).await {
            debug!("Write to {} failed: {}", client_id, e);
            break;
        }
    }

    let _ = writer.shutdown().await;
    debug!("Write task ended for {}", client_id);
}
