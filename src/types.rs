//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `RoomRef`: handle to either the lobby or one of the named rooms

use uuid::Uuid;

/// Unique client identifier (newtype pattern)
///
/// Wraps a UUID v4. Unique for the lifetime of a connection and
/// used as the membership key in every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a room inside the `RoomStore`
///
/// `Named` carries the index of the room in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoomRef {
    /// The pseudo-room holding every connected user
    #[default]
    Lobby,
    /// One of the fixed named rooms
    Named(usize),
}

impl RoomRef {
    /// Whether this reference points at the lobby
    pub fn is_lobby(self) -> bool {
        matches!(self, RoomRef::Lobby)
    }
}
