//! Server configuration
//!
//! Everything is in-process: the room catalog is fixed, only the bind
//! address and capacities can be overridden from the command line.

use clap::Parser;

/// Fixed catalog of named rooms, in declaration order
pub const ROOM_NAMES: [&str; 4] = ["General", "Random", "Tech", "Offtopic"];

/// Upper bound accepted for `--room-capacity`
pub const MAX_ROOM_CAPACITY: u16 = 1024;

/// Upper bound accepted for `--max-connections`
pub const MAX_CONNECTIONS: u32 = 65_536;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub addr: String,
    /// Names of the named rooms
    pub rooms: Vec<String>,
    /// Capacity of every named room
    pub room_capacity: usize,
    /// Capacity of the lobby, i.e. the maximum number of connections
    pub max_connections: usize,
}

fn default_addr() -> String {
    "127.0.0.1:9034".to_string()
}

fn default_rooms() -> Vec<String> {
    ROOM_NAMES.iter().map(|name| name.to_string()).collect()
}

fn default_room_capacity() -> usize {
    8
}

impl Default for ServerConfig {
    fn default() -> Self {
        let rooms = default_rooms();
        let room_capacity = default_room_capacity();
        Self {
            addr: default_addr(),
            max_connections: rooms.len() * room_capacity,
            rooms,
            room_capacity,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "oss_chat", version, about = "Multi-room line-oriented chat server")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value_t = default_addr())]
    pub addr: String,

    /// Maximum number of users per named room
    #[arg(
        long,
        default_value_t = 8,
        value_parser = clap::value_parser!(u16).range(1..=i64::from(MAX_ROOM_CAPACITY))
    )]
    pub room_capacity: u16,

    /// Maximum number of connected users (defaults to rooms × room capacity)
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CONNECTIONS))
    )]
    pub max_connections: Option<u32>,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        let rooms = default_rooms();
        let room_capacity = usize::from(cli.room_capacity);
        let max_connections = match cli.max_connections {
            Some(max) => max as usize,
            None => rooms.len().saturating_mul(room_capacity),
        };
        Self {
            addr: cli.addr,
            rooms,
            room_capacity,
            max_connections,
        }
    }
}
