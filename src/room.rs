//! Room and RoomStore definitions
//!
//! A fixed catalog of named rooms plus the lobby, with bounded-capacity
//! membership. Membership is an unordered set of `ClientId`s: removal
//! swaps the last member into the freed slot, so iteration order is
//! unspecified and must not be relied upon.

use crate::error::RoomError;
use crate::types::{ClientId, RoomRef};
use crate::user::User;

/// Name of the lobby pseudo-room
pub const LOBBY_NAME: &str = "lobby";

/// Bounded-capacity chat room
#[derive(Debug)]
pub struct Room {
    /// Room name, matched exactly by `!room`
    pub name: String,
    /// Maximum number of members
    pub capacity: usize,
    members: Vec<ClientId>,
}

impl Room {
    /// Create an empty room
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            members: Vec::new(),
        }
    }

    /// Current number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the room has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if the room is at capacity
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// Check if a client is a member
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Current members, in no particular order
    pub fn members(&self) -> &[ClientId] {
        &self.members
    }

    /// Add a member
    ///
    /// Adding an existing member is a no-op. Returns the new occupancy.
    fn insert(&mut self, client_id: ClientId) -> Result<usize, RoomError> {
        if self.contains(client_id) {
            return Ok(self.len());
        }
        if self.is_full() {
            return Err(RoomError::Full(self.name.clone()));
        }
        self.members.push(client_id);
        Ok(self.len())
    }

    /// Remove a member in O(1) by swapping the last member into its slot
    ///
    /// Returns the new occupancy.
    fn remove(&mut self, client_id: ClientId) -> Result<usize, RoomError> {
        let Some(pos) = self.members.iter().position(|id| *id == client_id) else {
            return Err(RoomError::NotPresent(self.name.clone()));
        };
        self.members.swap_remove(pos);
        Ok(self.len())
    }
}

/// Occupancy snapshot of one named room, as shown by `!list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStatus {
    pub name: String,
    pub occupancy: usize,
    pub capacity: usize,
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' - {}/{}", self.name, self.occupancy, self.capacity)
    }
}

/// The lobby plus the fixed catalog of named rooms
///
/// Every live user is a lobby member exactly once and a member of at
/// most one named room. `User::room` points at the named room if one
/// was joined, else at the lobby.
#[derive(Debug)]
pub struct RoomStore {
    lobby: Room,
    rooms: Vec<Room>,
}

impl RoomStore {
    /// Create the store with a lobby of `max_connections` and one room
    /// of `room_capacity` per name, in declaration order.
    pub fn new<I, S>(max_connections: usize, names: I, room_capacity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lobby: Room::new(LOBBY_NAME, max_connections),
            rooms: names
                .into_iter()
                .map(|name| Room::new(name, room_capacity))
                .collect(),
        }
    }

    /// Number of named rooms
    pub fn named_count(&self) -> usize {
        self.rooms.len()
    }

    /// The lobby
    pub fn lobby(&self) -> &Room {
        &self.lobby
    }

    /// Find a named room by exact, case-sensitive name
    pub fn find(&self, name: &str) -> Option<RoomRef> {
        self.rooms
            .iter()
            .position(|room| room.name == name)
            .map(RoomRef::Named)
    }

    /// Resolve a room reference
    ///
    /// Returns `None` for a named index outside the catalog.
    pub fn get(&self, room: RoomRef) -> Option<&Room> {
        match room {
            RoomRef::Named(index) => self.rooms.get(index),
            RoomRef::Lobby => Some(&self.lobby),
        }
    }

    fn get_mut(&mut self, room: RoomRef) -> Result<&mut Room, RoomError> {
        match room {
            RoomRef::Named(index) => self
                .rooms
                .get_mut(index)
                .ok_or(RoomError::NoSuchRoom(index)),
            RoomRef::Lobby => Ok(&mut self.lobby),
        }
    }

    /// Add `user` to `room` and point `user.room` at it
    ///
    /// A user already routed to a different named room is refused with
    /// `AlreadyInRoom`; moving between rooms goes through `transfer`.
    /// On any error neither the membership nor `user.room` change.
    pub fn join(&mut self, room: RoomRef, user: &mut User) -> Result<usize, RoomError> {
        if user.in_named_room() && user.room != room {
            let current = self
                .get(user.room)
                .map_or_else(|| LOBBY_NAME.to_string(), |r| r.name.clone());
            return Err(RoomError::AlreadyInRoom(current));
        }
        let occupancy = self.get_mut(room)?.insert(user.id)?;
        user.room = room;
        Ok(occupancy)
    }

    /// Remove `user` from `room`
    ///
    /// If `user.room` pointed at `room` it falls back to the lobby.
    pub fn leave(&mut self, room: RoomRef, user: &mut User) -> Result<usize, RoomError> {
        let occupancy = self.get_mut(room)?.remove(user.id)?;
        if user.room == room {
            user.room = RoomRef::Lobby;
        }
        Ok(occupancy)
    }

    /// Move `user` from its current room into `target`
    ///
    /// If `target` is full the user is restored to the room it was in
    /// before the call and `RoomError::Full` is returned.
    pub fn transfer(&mut self, user: &mut User, target: RoomRef) -> Result<usize, RoomError> {
        let prior = user.room;
        if !prior.is_lobby() {
            self.leave(prior, user)?;
        }

        match self.join(target, user) {
            Ok(occupancy) => Ok(occupancy),
            Err(err) => {
                if prior.is_lobby() {
                    user.room = RoomRef::Lobby;
                } else {
                    // The slot freed above is still available
                    self.join(prior, user)?;
                }
                Err(err)
            }
        }
    }

    /// Remove `user` from its named room (if any) and from the lobby
    ///
    /// The lobby is always cleaned up. A second call for the same user
    /// reports `NotPresent`.
    pub fn evict(&mut self, user: &mut User) -> Result<(), RoomError> {
        let named = if user.in_named_room() {
            self.leave(user.room, user).map(|_| ())
        } else {
            Ok(())
        };
        self.leave(RoomRef::Lobby, user)?;
        named
    }

    /// Occupancy of every named room, in declaration order
    pub fn list(&self) -> impl Iterator<Item = RoomStatus> + '_ {
        self.rooms.iter().map(|room| RoomStatus {
            name: room.name.clone(),
            occupancy: room.len(),
            capacity: room.capacity,
        })
    }
}
