//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use maintenance_gate::config::GateConfig;
use maintenance_gate::{HttpServer, Shutdown, SnapshotStore};

/// Body returned by the mock upstream.
pub const UPSTREAM_BODY: &str = "Hello from upstream";

/// Start a mock upstream that answers every request with 200 and
/// [`UPSTREAM_BODY`]. Returns its address.
pub async fn start_mock_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            UPSTREAM_BODY.len(),
                            UPSTREAM_BODY
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an upstream that accepts connections but never answers.
#[allow(dead_code)]
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// A running gate in front of a mock upstream.
pub struct TestGate {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<GateConfig>,
    #[allow(dead_code)]
    pub store: Arc<SnapshotStore>,
}

impl TestGate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGate {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Base configuration pointing at `upstream`, maintenance disabled.
pub fn config_for(upstream: SocketAddr, content_root: &Path) -> GateConfig {
    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.address = upstream.to_string();
    config.maintenance.content_root = Some(content_root.to_path_buf());
    config
}

/// Start the gate with `config` on an ephemeral port.
pub async fn start_gate(config: GateConfig) -> TestGate {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).expect("gate config should build");
    let store = server.gate();
    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestGate {
        addr,
        shutdown,
        updates,
        store,
    }
}

/// Write the two maintenance pages used across tests into `dir`.
#[allow(dead_code)]
pub fn write_pages(dir: &Path) {
    std::fs::write(dir.join("foo.html"), "<h1>Maintenance</h1>").unwrap();
    std::fs::write(dir.join("ok.txt"), "Maintenance").unwrap();
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
