//! WebSocket transport and message dispatch.
//!
//! One JSON text message per command. Every failure is caught at the
//! command boundary and converted into an error response; nothing a client
//! sends can take down the connection loop or the server process.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::server::context::{CommandError, ServerContext};
use crate::server::handlers;
use crate::server::protocol::{Command, Response, ResponseBody, Status, COMMANDS};

/// Run the WebSocket server on the configured port.
pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Arc::new(ServerContext::new(&config));

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on ws://{}/ws (root: {})",
        addr,
        ctx.root().display()
    );

    serve(listener, ctx).await?;
    Ok(())
}

/// Serve connections on an already-bound listener. Split out of
/// [`run_server`] so tests can bind an ephemeral port.
pub async fn serve(
    listener: tokio::net::TcpListener,
    ctx: Arc<ServerContext>,
) -> std::io::Result<()> {
    let app = Router::new().route("/ws", get(ws_handler)).with_state(ctx);
    axum::serve(listener, app).await
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<Arc<ServerContext>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx))
}

/// Handle a WebSocket connection: one request processed at a time, in
/// arrival order.
async fn handle_socket(mut socket: WebSocket, ctx: Arc<ServerContext>) {
    info!("New WebSocket connection established");

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!(len = text.len(), "Received client message");
                let response = process_message(&ctx, &text).await;
                let encoded = match serde_json::to_string(&response) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode response: {}", e);
                        continue;
                    }
                };
                if let Err(e) = socket.send(Message::Text(encoded)).await {
                    error!("Failed to send response: {}", e);
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!("Binary frame ignored, JSON text expected");
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket connection closed by client");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Handled automatically by axum
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        }
    }

    info!("WebSocket connection handler finished");
}

/// Parse and dispatch one raw message, always producing a response.
///
/// `requestId` is extracted before command parsing so it can be echoed even
/// when the command itself is invalid; for unparseable or unidentifiable
/// requests it is null.
pub async fn process_message(ctx: &ServerContext, raw: &str) -> Response {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => {
            warn!("Non-JSON message received");
            return error_response(None, "Invalid message, JSON expected.".to_string());
        }
    };

    let request_id = match value.get("requestId").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            warn!("Missing or invalid requestId");
            return error_response(
                None,
                "requestId is required and must be a non-empty string.".to_string(),
            );
        }
    };

    let command_name = match value.get("command").and_then(|v| v.as_str()) {
        Some(name) => name.to_string(),
        None => {
            return error_response(
                Some(request_id),
                "command is required and must be a string.".to_string(),
            );
        }
    };

    if !COMMANDS.contains(&command_name.as_str()) {
        let err = CommandError::UnknownCommand(command_name);
        warn!(code = err.code(), "{}", err);
        return error_response(Some(request_id), err.to_string());
    }

    let command: Command = match serde_json::from_value(value) {
        Ok(cmd) => cmd,
        Err(e) => {
            let err = CommandError::Validation(format!(
                "Invalid fields for '{}': {}",
                command_name, e
            ));
            warn!(code = err.code(), "{}", err);
            return error_response(Some(request_id), err.to_string());
        }
    };

    match handlers::dispatch(ctx, command).await {
        Ok(output) => {
            debug!(request_id = %request_id, command = %command_name, "Command handled");
            Response {
                request_id: Some(request_id),
                status: output.status,
                body: output.body,
            }
        }
        Err(e) => {
            warn!(
                request_id = %request_id,
                command = %command_name,
                code = e.code(),
                "Command failed: {}",
                e
            );
            error_response(Some(request_id), e.to_string())
        }
    }
}

fn error_response(request_id: Option<String>, message: String) -> Response {
    Response {
        request_id,
        status: Status::Error,
        body: ResponseBody::Message { message },
    }
}
