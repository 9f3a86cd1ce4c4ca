//! Multi-room line-oriented chat server library
//!
//! Clients connect over TCP, join one of a fixed set of named rooms and
//! exchange plain text lines broadcast to the room's members.
//!
//! # Protocol
//! - A plain line is broadcast as `<nickname>: <line>` to every member of
//!   the sender's room. Users still in the lobby get a hint instead.
//! - `!welcome`, `!nick <newnick>`, `!room <roomname>`, `!list` and
//!   `!help` are commands. An unrecognized `!token` is a plain line.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning users and rooms
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use oss_chat::{serve, ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(&config.addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx, &config).run());
//!     serve(listener, cmd_tx).await;
//! }
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod listener;
pub mod message;
pub mod room;
pub mod server;
pub mod types;
pub mod user;

// Re-export main types for convenience
pub use command::{parse_line, CommandKind, Input, COMMANDS};
pub use config::{Cli, ServerConfig};
pub use error::{AppError, RoomError, SendError};
pub use handler::handle_connection;
pub use listener::{serve, Listener};
pub use message::ServerMessage;
pub use room::{Room, RoomStatus, RoomStore};
pub use server::{ChatServer, DisconnectReason, ServerCommand};
pub use types::{ClientId, RoomRef};
pub use user::User;
