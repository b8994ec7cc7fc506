//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use cors_gateway::config::GatewayConfig;
use cors_gateway::http::GatewayServer;
use cors_gateway::lifecycle::Shutdown;

/// Gateway config pointed at a test upstream, with a deterministic
/// allow-list.
pub fn test_config(proxy_addr: SocketAddr, upstream_addr: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.upstream.address = upstream_addr.to_string();
    config.cors.allowed_origins = vec![
        "http://localhost:5173".to_string(),
        "http://frontend.example:7777".to_string(),
    ];
    config
}

/// Start the gateway on its configured address. Returns the shutdown
/// coordinator so the test can stop it.
pub async fn spawn_gateway(config: GatewayConfig) -> Shutdown {
    let addr: SocketAddr = config.listener.bind_address.parse().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = GatewayServer::new(config).unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    shutdown
}

/// Start a simple mock backend that returns a fixed JSON response.
pub async fn start_mock_backend(addr: SocketAddr, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that sleeps before replying, to exercise the
/// forwarding timeout.
pub async fn start_slow_backend(addr: SocketAddr, delay: Duration) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        tokio::time::sleep(delay).await;
                        let response =
                            "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nslow";
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// A request captured by the recording backend.
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// The raw request line, e.g. `GET /items?page=2 HTTP/1.1`.
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    /// Case-insensitive header lookup over the captured head.
    pub fn header(&self, name: &str) -> Option<String> {
        for line in self.head.lines().skip(1) {
            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case(name) {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }
}

/// Start a backend that records every request it receives and replies
/// 200 with a small JSON body.
pub async fn start_recording_backend(addr: SocketAddr) -> mpsc::UnboundedReceiver<CapturedRequest> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(captured) = read_request(&mut socket).await {
                            let _ = tx.send(captured);
                        }
                        let response = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\nConnection: close\r\n\r\n{\"ok\":true}";
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}

/// Read one HTTP/1.1 request (head plus content-length body) off the socket.
async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > 1_048_576 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = content_length_of(&head).unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Some(CapturedRequest { head, body })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length_of(head: &str) -> Option<usize> {
    for line in head.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value.trim().parse().ok();
            }
        }
    }
    None
}
