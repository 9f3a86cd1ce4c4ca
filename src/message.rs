//! Server → client messages
//!
//! The line protocol has no framing beyond the stream itself: every
//! message renders to one or more `\n`-terminated lines and is written
//! to the socket in a single write.

use crate::command::COMMANDS;
use crate::error::AppError;
use crate::room::RoomStatus;

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Greeting sent on connect and by `!welcome`
    Welcome { rooms: usize },
    /// Nickname changed by `!nick`
    NickChanged { name: String },
    /// Room changed by `!room`
    RoomJoined { room: String },
    /// Occupancy table for `!list`
    RoomList(Vec<RoomStatus>),
    /// Command reference for `!help`
    Help,
    /// Broadcast line from a room member
    Chat { from: String, content: String },
    /// Explanatory reply for a protocol or capacity error
    Error { message: String },
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMessage::Welcome { rooms } => {
                writeln!(f, "Welcome to oss chat!")?;
                writeln!(f, "There are {rooms} available rooms.")?;
                writeln!(f, "To see list of available commands type '!help'.")?;
                writeln!(f, "To see this message again type '!welcome'.")
            }
            ServerMessage::NickChanged { name } => {
                writeln!(f, "Nickname was successfully changed to '{name}'.")
            }
            ServerMessage::RoomJoined { room } => writeln!(f, "Welcome to room '{room}'!"),
            ServerMessage::RoomList(rooms) => {
                writeln!(f, "Available rooms:")?;
                for status in rooms {
                    writeln!(f, "{status}")?;
                }
                Ok(())
            }
            ServerMessage::Help => {
                writeln!(f, "The list of available commands:")?;
                for cmd in COMMANDS {
                    writeln!(f, "{}", cmd.help())?;
                }
                Ok(())
            }
            ServerMessage::Chat { from, content } => writeln!(f, "{from}: {content}"),
            ServerMessage::Error { message } => writeln!(f, "{message}"),
        }
    }
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let message = if err.is_recoverable() {
            err.to_string()
        } else {
            // Fatal errors are not typically converted (connection closes)
            "Internal error.".to_string()
        };
        ServerMessage::Error { message }
    }
}
