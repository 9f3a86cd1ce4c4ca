//! ChatServer Actor implementation
//!
//! The central actor that owns all state: the connection registry, the
//! room store and every user. Commands from connection handlers are
//! processed one at a time, so each join/leave/transfer and each
//! broadcast completes before the next command is looked at.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::command::{parse_line, CommandKind, Input};
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::room::RoomStore;
use crate::types::{ClientId, RoomRef};
use crate::user::User;

/// Why a connection is being torn down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Peer closed the stream or the writer gave up
    Closed,
    /// Read error on the stream
    Error(String),
}

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Connect {
        client_id: ClientId,
        peer: String,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// One inbound line from a client
    Line {
        client_id: ClientId,
        line: String,
    },
    /// Connection closed or failed
    Disconnect {
        client_id: ClientId,
        reason: DisconnectReason,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// All connected users: ClientId -> User
    users: HashMap<ClientId, User>,
    /// Lobby and named rooms
    rooms: RoomStore,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, config: &ServerConfig) -> Self {
        Self {
            users: HashMap::new(),
            rooms: RoomStore::new(
                config.max_connections,
                config.rooms.iter().cloned(),
                config.room_capacity,
            ),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!(
            "ChatServer started with {} rooms, {} connections max",
            self.rooms.named_count(),
            self.rooms.lobby().capacity
        );

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!(
            "ChatServer shutting down, closing {} connections",
            self.users.len()
        );
        // Dropping the users closes their outbound queues, which ends the writer tasks
        self.users.clear();
    }

    /// Number of connected users
    pub fn client_count(&self) -> usize {
        self.users.len()
    }

    /// Occupancy of a named room
    pub fn occupancy(&self, room: &str) -> Option<usize> {
        self.rooms
            .find(room)
            .and_then(|r| self.rooms.get(r))
            .map(|r| r.len())
    }

    /// Name of the room a user is currently routed to
    pub fn room_of(&self, client_id: ClientId) -> Option<&str> {
        self.users
            .get(&client_id)
            .and_then(|user| self.rooms.get(user.room))
            .map(|room| room.name.as_str())
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                peer,
                sender,
            } => {
                self.handle_connect(client_id, peer, sender);
            }
            ServerCommand::Line { client_id, line } => {
                self.handle_line(client_id, &line);
            }
            ServerCommand::Disconnect { client_id, reason } => {
                self.handle_disconnect(client_id, reason);
            }
        }
    }

    /// Handle new connection: register in the lobby and greet
    fn handle_connect(
        &mut self,
        client_id: ClientId,
        peer: String,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let mut user = User::new(client_id, peer, sender);

        if let Err(e) = self.rooms.join(RoomRef::Lobby, &mut user) {
            warn!("Rejecting client {} from {}: {}", client_id, user.peer, e);
            if let Err(e) = user.send(AppError::ServerFull.into()) {
                warn!("Failed to notify rejected client {}: {}", client_id, e);
            }
            return;
        }

        info!("Client {} connected from {}", client_id, user.peer);

        if let Err(e) = user.send(ServerMessage::Welcome {
            rooms: self.rooms.named_count(),
        }) {
            warn!("Failed to greet {}: {}", client_id, e);
        }
        self.users.insert(client_id, user);

        debug!("Total clients: {}", self.users.len());
    }

    /// Handle client disconnection
    ///
    /// Returns false if the client was already torn down.
    fn handle_disconnect(&mut self, client_id: ClientId, reason: DisconnectReason) -> bool {
        let Some(mut user) = self.users.remove(&client_id) else {
            debug!("Client {} already disconnected", client_id);
            return false;
        };

        match reason {
            DisconnectReason::Closed => info!("Client {} ({}) hung up", client_id, user.name),
            DisconnectReason::Error(e) => {
                warn!("Client {} ({}) read error: {}", client_id, user.name, e)
            }
        }

        if let Err(e) = self.rooms.evict(&mut user) {
            warn!("Cleanup of client {} was incomplete: {}", client_id, e);
        }

        debug!("Total clients: {}", self.users.len());
        true
    }

    /// Handle one inbound line: command first, broadcast otherwise
    fn handle_line(&mut self, client_id: ClientId, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        match self.dispatch(client_id, line) {
            Some(kind) => debug!("Client {} ran {}", client_id, kind),
            None => {
                self.broadcast(client_id, line);
            }
        }
    }

    /// Run the command in `line`, if any, and reply to the sender
    ///
    /// Returns the matched command, or `None` if the line is a plain
    /// message that should be broadcast.
    fn dispatch(&mut self, client_id: ClientId, line: &str) -> Option<CommandKind> {
        let Input::Command { kind, arg } = parse_line(line) else {
            return None;
        };
        let user = self.users.get_mut(&client_id)?;
        let rooms = &mut self.rooms;

        let result = match kind {
            CommandKind::Welcome => Ok(ServerMessage::Welcome {
                rooms: rooms.named_count(),
            }),
            CommandKind::Nick => command_nick(user, arg),
            CommandKind::Room => command_room(rooms, user, arg),
            CommandKind::List => Ok(ServerMessage::RoomList(rooms.list().collect())),
            CommandKind::Help => Ok(ServerMessage::Help),
        };

        let reply = result.unwrap_or_else(ServerMessage::from);
        if let Err(e) = user.send(reply) {
            warn!("Failed to reply to {}: {}", client_id, e);
        }
        Some(kind)
    }

    /// Send `text` to every member of the sender's room, sender included
    ///
    /// A sender still in the lobby only gets a hint to join a room.
    /// Returns the number of recipients the message was queued for.
    fn broadcast(&self, client_id: ClientId, text: &str) -> usize {
        let Some(sender) = self.users.get(&client_id) else {
            return 0;
        };

        if !sender.in_named_room() {
            if let Err(e) = sender.send(AppError::NotInRoom.into()) {
                warn!("Failed to reply to {}: {}", client_id, e);
            }
            return 0;
        }

        let msg = ServerMessage::Chat {
            from: sender.name.clone(),
            content: text.to_string(),
        };

        let Some(room) = self.rooms.get(sender.room) else {
            warn!("Client {} is routed to an unknown room", client_id);
            return 0;
        };

        let mut delivered = 0;
        for member_id in room.members() {
            let Some(member) = self.users.get(member_id) else {
                continue;
            };
            match member.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to deliver to {}: {}", member_id, e),
            }
        }
        delivered
    }
}

/// `!nick <newnick>`
fn command_nick(user: &mut User, arg: Option<String>) -> Result<ServerMessage, AppError> {
    let name = arg.ok_or(AppError::MissingArgument("newnick"))?;
    info!("Client {} renamed '{}' -> '{}'", user.id, user.name, name);
    user.set_name(name.clone());
    Ok(ServerMessage::NickChanged { name })
}

/// `!room <roomname>`
fn command_room(
    rooms: &mut RoomStore,
    user: &mut User,
    arg: Option<String>,
) -> Result<ServerMessage, AppError> {
    let name = arg.ok_or(AppError::MissingArgument("roomname"))?;
    let target = rooms
        .find(&name)
        .ok_or_else(|| AppError::RoomNotFound(name.clone()))?;

    match rooms.transfer(user, target) {
        Ok(occupancy) => {
            info!(
                "Client {} joined room {} ({}/{})",
                user.id,
                name,
                occupancy,
                rooms.get(target).map_or(0, |r| r.capacity)
            );
            Ok(ServerMessage::RoomJoined { room: name })
        }
        Err(e) => {
            debug!("Client {} could not join {}: {}", user.id, name, e);
            Err(AppError::RoomFull(name))
        }
    }
}
