//! Event sink that mirrors published room events into the log.
use async_trait::async_trait;
use tracing::debug;

use runtime::{EventPublisher, PublishError, RoomEvent};

/// Logs the wire payload of every room event at `debug`.
///
/// Stands in for the external fan-out transport until one is plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &RoomEvent) -> Result<(), PublishError> {
        let payload = event.to_json()?;
        debug!(channel = %event.channel(), event = event.name(), "{}", payload);
        Ok(())
    }
}
