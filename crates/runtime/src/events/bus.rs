//! Room-keyed in-process event bus.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use checkers_core::RoomId;

use super::{EventPublisher, PublishError, RoomEvent};

/// In-process fan-out with one broadcast channel per room.
///
/// Channels are created on first subscription and dropped when the room
/// closes. Events for rooms nobody listens to are discarded.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<RoomId, broadcast::Sender<RoomEvent>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each room
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per room
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a room's events.
    pub async fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<RoomEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of rooms with an open channel.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn publish(&self, event: &RoomEvent) -> Result<(), PublishError> {
        let room_id = event.room_id();

        if let Some(tx) = self.channels.read().await.get(room_id)
            && tx.send(event.clone()).is_err()
        {
            // No subscribers left for this room - this is normal, not an error
            tracing::trace!("No subscribers for room {}", room_id);
        }

        if matches!(event, RoomEvent::RoomClosed { .. }) {
            self.channels.write().await.remove(room_id);
        }

        Ok(())
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
