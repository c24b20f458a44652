//! Publish-only sink abstraction for room events.
use async_trait::async_trait;
use thiserror::Error;

use super::RoomEvent;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("publisher unavailable: {0}")]
    Unavailable(String),
}

/// Trait for delivering room events to observers.
///
/// Implementations may be in-process ([`super::EventBus`]) or wrap an external
/// real-time transport. Calls happen on the publish worker, never while a
/// room is locked.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver one event to the room's channel.
    async fn publish(&self, event: &RoomEvent) -> Result<(), PublishError>;
}
