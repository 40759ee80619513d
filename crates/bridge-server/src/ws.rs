//! WebSocket endpoint for the broadcast stream
//!
//! Connection establishment alone constitutes subscription; each
//! published value arrives as a one-character text frame ("0" or "1").
//! No error is ever delivered over the subscriber channel — during a
//! serial reconnection clients simply see the stream pause.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use bridge_stream::BroadcastHub;
use std::sync::Arc;
use tracing::debug;

/// Build the router exposing the stream endpoint at `/ws`.
pub fn router(hub: Arc<BroadcastHub>) -> Router {
    Router::new()
        .route("/ws", get(handle_upgrade))
        .with_state(hub)
}

async fn handle_upgrade(ws: WebSocketUpgrade, State(hub): State<Arc<BroadcastHub>>) -> Response {
    ws.on_upgrade(move |socket| handle_subscriber(socket, hub))
}

/// Forward the classified stream to one client until it disconnects.
async fn handle_subscriber(mut socket: WebSocket, hub: Arc<BroadcastHub>) {
    let (id, mut values) = hub.subscribe().await;

    loop {
        tokio::select! {
            value = values.recv() => match value {
                Some(state) => {
                    if socket
                        .send(Message::Text(state.wire_token().into()))
                        .await
                        .is_err()
                    {
                        break; // client disconnected
                    }
                }
                // Channel closed by the hub: slow-consumer drop or shutdown.
                None => break,
            },
            message = socket.recv() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Incoming client traffic only keeps the connection alive.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(subscriber = %id, "websocket session ended");
    hub.unsubscribe(id).await;
}
