//! End-to-end WebSocket tests: a real server on an ephemeral port, a real
//! tungstenite client, JSON text frames over the wire.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use devlink_core::server::{serve, ServerContext};
use devlink_core::Config;

type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

const TIMEOUT_SECS: u64 = 5;

struct TestServer {
    url: String,
    _temp: TempDir,
}

async fn spawn_server() -> TestServer {
    let temp = TempDir::new().unwrap();
    let ctx = Arc::new(ServerContext::new(&Config {
        root: temp.path().to_path_buf(),
        port: 0,
        task_command: "printf e2e".to_string(),
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, ctx));

    TestServer {
        url: format!("ws://{}/ws", addr),
        _temp: temp,
    }
}

async fn connect(server: &TestServer) -> WsClient {
    let (socket, _) = connect_async(&server.url).await.unwrap();
    socket
}

async fn request(socket: &mut WsClient, body: Value) -> Value {
    socket.send(Message::Text(body.to_string())).await.unwrap();
    loop {
        let frame = timeout(Duration::from_secs(TIMEOUT_SECS), socket.next())
            .await
            .expect("timed out waiting for response")
            .expect("connection closed")
            .unwrap();
        match frame {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test]
async fn create_and_fetch_over_websocket() {
    let server = spawn_server().await;
    let mut socket = connect(&server).await;

    let content = "alpha\nbeta\n";
    let response = request(
        &mut socket,
        json!({"requestId": "ws-1", "command": "create-file",
               "path": "deep/dir/file.txt", "content": content}),
    )
    .await;
    assert_eq!(response["requestId"], "ws-1");
    assert_eq!(response["status"], "success");

    let response = request(
        &mut socket,
        json!({"requestId": "ws-2", "command": "get-file", "path": "deep/dir/file.txt"}),
    )
    .await;
    assert_eq!(response["requestId"], "ws-2");
    assert_eq!(response["status"], "success");
    assert_eq!(response["content"], content);

    socket.close(None).await.unwrap();
}

#[tokio::test]
async fn server_survives_garbage_and_keeps_serving() {
    let server = spawn_server().await;
    let mut socket = connect(&server).await;

    let response = request(&mut socket, json!("just a string")).await;
    assert_eq!(response["requestId"], Value::Null);
    assert_eq!(response["status"], "error");

    // Same connection still works afterwards
    let response = request(
        &mut socket,
        json!({"requestId": "after", "command": "list-files"}),
    )
    .await;
    assert_eq!(response["requestId"], "after");
    assert_eq!(response["status"], "success");
    assert_eq!(response["files"], json!([]));
}

#[tokio::test]
async fn batch_results_arrive_in_request_order() {
    let server = spawn_server().await;
    let mut socket = connect(&server).await;

    let response = request(
        &mut socket,
        json!({"requestId": "b", "command": "create-files", "files": [
            {"path": "z.txt", "content": "z"},
            {"path": "a.txt", "content": "a"},
            {"path": "m.txt", "content": "m"}
        ]}),
    )
    .await;

    assert_eq!(response["status"], "success");
    let results = response["results"].as_array().unwrap();
    let order: Vec<&str> = results
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["z.txt", "a.txt", "m.txt"]);
}
