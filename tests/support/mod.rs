// Shared helpers: one server per test binary plus a small WebSocket client.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

// Host:port the shared server is listening on.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
// Guards the bootstrap path so it runs once per test binary.
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

// Ensure the test server is running and return its host:port.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port avoids collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                arena_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_readiness(published_addr);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

fn wait_for_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub fn http_url(path: &str) -> String {
    format!("http://{}{}", ensure_server(), path)
}

pub struct TestClient {
    pub ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub id: String,
    pub bootstrap: Value,
}

impl TestClient {
    /// Connects and consumes the bootstrap, which must be the first frame.
    pub async fn connect() -> Self {
        let url = format!("ws://{}/ws", ensure_server());
        let (mut ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .expect("websocket handshake");

        let first = next_json(&mut ws).await;
        assert_eq!(first["type"], "bootstrap", "first frame was {first}");
        let bootstrap = first["data"].clone();
        let id = bootstrap["id"]
            .as_str()
            .expect("bootstrap id is a string")
            .to_string();
        Self { ws, id, bootstrap }
    }

    /// This client's player entry from its own bootstrap.
    pub fn me(&self) -> &Value {
        &self.bootstrap["players"][self.id.as_str()]
    }

    pub async fn send(&mut self, value: Value) {
        self.ws
            .send(Message::text(value.to_string()))
            .await
            .expect("send frame");
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::text(text.to_string()))
            .await
            .expect("send frame");
    }

    pub async fn move_dir(&mut self, direction: &str) {
        self.send(serde_json::json!({"type": "move", "data": {"direction": direction}}))
            .await;
    }

    /// Reads frames until one satisfies `pred`, skipping traffic from other tests.
    pub async fn recv_until<F>(&mut self, mut pred: F) -> Value
    where
        F: FnMut(&Value) -> bool,
    {
        loop {
            let value = next_json(&mut self.ws).await;
            if pred(&value) {
                return value;
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

pub async fn next_json(ws: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("server sent valid json");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

pub fn is_event_for(value: &Value, kind: &str, id: &str) -> bool {
    value["type"] == kind && value["data"]["id"] == id
}
