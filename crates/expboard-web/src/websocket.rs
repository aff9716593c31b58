//! WebSocket handler for live board refreshes.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, WebSocketMessage};

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Message to forward for one broadcast receive, `None` once the channel closed.
///
/// A lagged client missed some changes, so it gets a full refresh instead.
fn outgoing(received: Result<WebSocketMessage, RecvError>) -> Option<WebSocketMessage> {
    match received {
        Ok(msg) => Some(msg),
        Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "WebSocket client lagged, requesting a board refresh");
            Some(WebSocketMessage::BoardRefresh)
        }
        Err(RecvError::Closed) => None,
    }
}

/// Forward board change notifications to one client until it goes away.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    let receiver_count = state.tx.receiver_count();
    info!(receiver_count, "WebSocket client connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outgoing(rx.recv().await) {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode board message");
                    continue;
                }
            };
            debug!(message = %json, "Sending message to WebSocket client");
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    // Clients only listen; drain until close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                debug!("WebSocket client sent close frame");
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[test]
    fn test_outgoing_passes_messages_through() {
        let msg = WebSocketMessage::ExperimentDeleted { experiment_id: 4 };
        assert_eq!(outgoing(Ok(msg.clone())), Some(msg));
        assert_eq!(outgoing(Err(RecvError::Closed)), None);
    }

    #[tokio::test]
    async fn test_lagged_receiver_keeps_refreshing() {
        let (tx, mut rx) = broadcast::channel(2);
        for id in 0..5 {
            tx.send(WebSocketMessage::ExperimentDeleted { experiment_id: id })
                .unwrap();
        }

        assert_eq!(
            outgoing(rx.recv().await),
            Some(WebSocketMessage::BoardRefresh)
        );
        // Later messages still arrive after the lag.
        assert_eq!(
            outgoing(rx.recv().await),
            Some(WebSocketMessage::ExperimentDeleted { experiment_id: 3 })
        );
    }
}
