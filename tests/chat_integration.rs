//! Integration tests for the chat server over loopback TCP.

use std::net::SocketAddr;
use std::time::Duration;

use oss_chat::{serve, ChatServer, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

const READ_TIMEOUT: Duration = Duration::from_secs(2);

async fn start_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (cmd_tx, cmd_rx) = mpsc::channel(256);
    tokio::spawn(ChatServer::new(cmd_rx, &config).run());
    tokio::spawn(serve(listener, cmd_tx));

    addr
}

/// Client that accumulates everything received, since replies carry no framing
struct TestClient {
    stream: TcpStream,
    received: String,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let mut client = Self {
            stream,
            received: String::new(),
        };
        client
            .read_until("To see this message again type '!welcome'.\n")
            .await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    /// Read until `needle` arrives; returns everything up to and including it
    async fn read_until(&mut self, needle: &str) -> String {
        loop {
            if let Some(pos) = self.received.find(needle) {
                let end = pos + needle.len();
                return self.received.drain(..end).collect();
            }
            let mut buf = [0u8; 1024];
            let n = timeout(READ_TIMEOUT, self.stream.read(&mut buf))
                .await
                .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}, got {:?}", self.received))
                .unwrap();
            assert!(n > 0, "connection closed while waiting for {needle:?}");
            self.received.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
    }

    /// Assert nothing arrives within a short window
    async fn expect_silence(&mut self) {
        let mut buf = [0u8; 1024];
        let result = timeout(Duration::from_millis(200), self.stream.read(&mut buf)).await;
        assert!(result.is_err(), "unexpected data: {:?}", result);
        assert!(self.received.is_empty(), "unexpected data: {:?}", self.received);
    }

    async fn join(&mut self, room: &str) {
        self.send(&format!("!room {room}")).await;
        self.read_until(&format!("Welcome to room '{room}'!\n")).await;
    }
}

#[tokio::test]
async fn test_broadcast_reaches_room_members_only() {
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let mut carol = TestClient::connect(addr).await;

    alice.join("General").await;
    bob.join("General").await;
    carol.join("Random").await;

    alice.send("hello").await;

    alice.read_until("anonymous: hello\n").await;
    bob.read_until("anonymous: hello\n").await;
    carol.expect_silence().await;
}

#[tokio::test]
async fn test_nick_is_used_as_prefix() {
    let addr = start_server(ServerConfig::default()).await;
    let mut client = TestClient::connect(addr).await;

    client.send("!nick Bob").await;
    client.read_until("Nickname was successfully changed").await;
    client.join("General").await;
    client.send("hi").await;

    client.read_until("Bob: hi\n").await;
}

#[tokio::test]
async fn test_lobby_user_gets_hint() {
    let addr = start_server(ServerConfig::default()).await;
    let mut client = TestClient::connect(addr).await;

    client.send("hello").await;

    client.read_until("You are not in a room.").await;
}

#[tokio::test]
async fn test_lines_split_across_writes_are_reassembled() {
    let addr = start_server(ServerConfig::default()).await;
    let mut client = TestClient::connect(addr).await;
    client.join("Tech").await;

    client.stream.write_all(b"hel").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.stream.write_all(b"lo\r\n!li").await.unwrap();
    client.stream.write_all(b"st\n").await.unwrap();

    client.read_until("anonymous: hello\n").await;
    client.read_until("'Tech' - 1/8\n").await;
}

#[tokio::test]
async fn test_disconnect_frees_room_slot() {
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.join("General").await;
    bob.send("!list").await;
    bob.read_until("'General' - 1/8\n").await;

    drop(alice);

    // Teardown is processed asynchronously by the server
    let mut freed = false;
    for _ in 0..20 {
        bob.send("!list").await;
        let listing = bob.read_until("'Offtopic' - 0/8\n").await;
        if listing.contains("'General' - 0/8") {
            freed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(freed);
}

#[tokio::test]
async fn test_full_room_rejects_join() {
    let config = ServerConfig {
        room_capacity: 1,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.join("General").await;
    bob.send("!room General").await;
    bob.read_until("Can't change room.").await;

    bob.send("still lobby").await;
    bob.read_until("You are not in a room.").await;
}

#[tokio::test]
async fn test_server_full_closes_connection() {
    let config = ServerConfig {
        max_connections: 1,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let _first = TestClient::connect(addr).await;

    let mut second = TcpStream::connect(addr).await.unwrap();
    let mut received = Vec::new();
    timeout(READ_TIMEOUT, second.read_to_end(&mut received))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        String::from_utf8_lossy(&received),
        "Server is full. Try again later.\n"
    );
}
