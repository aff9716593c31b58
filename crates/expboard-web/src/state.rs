//! Application state.

use expboard_db::DbPool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket message types. Any of them tells an open board to re-fetch.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum WebSocketMessage {
    ExperimentUpdated { experiment_id: i64, status: String },
    ExperimentDeleted { experiment_id: i64 },
    BoardRefresh,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub tx: broadcast::Sender<WebSocketMessage>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { db, tx }
    }

    /// Broadcast a message to all WebSocket clients.
    pub fn broadcast(&self, msg: WebSocketMessage) {
        // No subscribers is not an error.
        let _ = self.tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let msg = WebSocketMessage::ExperimentUpdated {
            experiment_id: 3,
            status: "done".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"type": "ExperimentUpdated", "data": {"experiment_id": 3, "status": "done"}})
        );
        assert_eq!(
            serde_json::to_value(WebSocketMessage::BoardRefresh).unwrap(),
            serde_json::json!({"type": "BoardRefresh"})
        );
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let state = AppState::new(Arc::new(expboard_db::init_memory_pool().unwrap()));
        state.broadcast(WebSocketMessage::BoardRefresh);

        let mut rx = state.tx.subscribe();
        state.broadcast(WebSocketMessage::ExperimentDeleted { experiment_id: 1 });
        assert_eq!(
            rx.try_recv().unwrap(),
            WebSocketMessage::ExperimentDeleted { experiment_id: 1 }
        );
    }
}
