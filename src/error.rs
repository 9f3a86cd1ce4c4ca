//! Error types for the chat server
//!
//! Defines application-level errors, room membership errors and
//! outbound send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// protocol/capacity errors (explanatory reply line to the client).
/// The display text of the recoverable variants is exactly what the
/// client receives.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// A command was sent without its required argument
    #[error("Missed argument: '{0}'.")]
    MissingArgument(&'static str),

    /// No named room matches the requested name
    #[error("Room '{0}' doesn't exist. Type '!list' to see available rooms.")]
    RoomNotFound(String),

    /// The requested room is at capacity
    #[error("Can't change room. Room '{0}' is full.")]
    RoomFull(String),

    /// A plain message was sent from the lobby
    #[error("You are not in a room. Type '!list' to see rooms and '!room <name>' to join one.")]
    NotInRoom,

    /// The lobby is at capacity, no more connections are accepted
    #[error("Server is full. Try again later.")]
    ServerFull,
}

impl AppError {
    /// Whether this error is reported to the client as a reply line
    /// rather than tearing the connection down.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Io(_) | AppError::ChannelSend)
    }
}

/// Room membership errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The room already holds `capacity` members
    #[error("Room '{0}' is full")]
    Full(String),

    /// The user is not a member of the room
    #[error("User is not a member of room '{0}'")]
    NotPresent(String),

    /// The user is already routed to another named room
    #[error("User is already in room '{0}'")]
    AlreadyInRoom(String),

    /// The named room index is outside the catalog
    #[error("No room with index {0}")]
    NoSuchRoom(usize),
}

/// Message send errors
///
/// Occurs when a message cannot be queued for a client's writer task.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The client's outbound queue is full, the message was dropped
    #[error("Outbound queue full")]
    QueueFull,
}
