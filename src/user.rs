//! User struct definition
//!
//! Represents a connected user with their display name, current room
//! and outbound message queue.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{ClientId, RoomRef};

/// Display name given to every new connection
pub const DEFAULT_NAME: &str = "anonymous";

/// Connected user state
///
/// Owned by the connection registry inside `ChatServer`. Rooms only
/// hold the `ClientId`.
#[derive(Debug)]
pub struct User {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Remote address as reported by the listener
    pub peer: String,
    /// Display name used to tag broadcasts
    pub name: String,
    /// Current room: the joined named room, else the lobby
    pub room: RoomRef,
    /// Server → Client message queue
    sender: mpsc::Sender<ServerMessage>,
}

impl User {
    /// Create a new user in the lobby with the default name
    pub fn new(id: ClientId, peer: impl Into<String>, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            peer: peer.into(),
            name: DEFAULT_NAME.to_string(),
            room: RoomRef::Lobby,
            sender,
        }
    }

    /// Queue a message for this user's writer task
    ///
    /// Never waits: a full queue drops the message and reports
    /// `SendError::QueueFull`.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Set the user's display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the user has joined a named room
    pub fn in_named_room(&self) -> bool {
        !self.room.is_lobby()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let user = User::new(ClientId::new(), "127.0.0.1:5000", tx);

        assert_eq!(user.name, "anonymous");
        assert_eq!(user.room, RoomRef::Lobby);
        assert!(!user.in_named_room());
    }

    #[test]
    fn test_user_rename() {
        let (tx, _rx) = mpsc::channel(32);
        let mut user = User::new(ClientId::new(), "peer", tx);

        user.set_name("Bob");

        assert_eq!(user.name, "Bob");
    }

    #[test]
    fn test_send_reports_closed_and_full() {
        let (tx, rx) = mpsc::channel(1);
        let user = User::new(ClientId::new(), "peer", tx);

        assert!(user.send(ServerMessage::Help).is_ok());
        assert!(matches!(
            user.send(ServerMessage::Help),
            Err(SendError::QueueFull)
        ));

        drop(rx);
        assert!(matches!(
            user.send(ServerMessage::Help),
            Err(SendError::ChannelClosed)
        ));
    }
}
