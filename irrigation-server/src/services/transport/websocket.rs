use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use irrigation_api::{ClientMessage, ServerMessage, decode, encode};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::services::RelayHandle;

#[derive(Clone)]
pub struct WebSocketState {
    pub relay: RelayHandle,
}

pub fn websocket_router(state: WebSocketState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebSocketState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

pub async fn handle_websocket(socket: WebSocket, state: WebSocketState) {
    let connection = match state.relay.connect().await {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("Rejecting WebSocket client: {}", e);
            return;
        }
    };

    let connection_id = connection.id;
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("WebSocket client {} connected", connection_id);

    let send_task = tokio::spawn(async move {
        for message in connection.initial_sync {
            if !send_message(&mut sender, &message).await {
                return;
            }
        }

        let mut broadcasts = BroadcastStream::new(connection.receiver);
        while let Some(item) = broadcasts.next().await {
            match item {
                Ok(message) => {
                    if !send_message(&mut sender, &message).await {
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "WebSocket client {} lagged, skipped {} messages",
                        connection_id,
                        skipped
                    );
                }
            }
        }
        tracing::info!("WebSocket client {} send task ended", connection_id);
    });

    while let Some(result) = receiver.next().await {
        let frame = match result {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Dropping non UTF-8 frame from {}", connection_id);
                    continue;
                }
            },
            Ok(WsMessage::Close(_)) => {
                tracing::info!("WebSocket client {} closed", connection_id);
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket error for client {}: {}", connection_id, e);
                break;
            }
            _ => continue,
        };

        match decode::<ClientMessage>(&frame) {
            Ok(message) => {
                if let Err(e) = state.relay.dispatch(connection_id, message).await {
                    tracing::error!("Failed to dispatch message from {}: {}", connection_id, e);
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Dropping malformed frame from {}: {}", connection_id, e);
            }
        }
    }

    send_task.abort();
    if let Err(e) = state.relay.disconnect(connection_id).await {
        tracing::error!("Failed to detach {}: {}", connection_id, e);
    }

    tracing::info!("WebSocket client {} disconnected", connection_id);
}

async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> bool
where
    S: futures::Sink<WsMessage> + Unpin,
{
    let text = match encode(message) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Failed to encode {}: {}", message.event_name(), e);
            return true;
        }
    };

    sender.send(WsMessage::Text(text)).await.is_ok()
}
