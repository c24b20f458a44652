//! Outbound room events and the sinks that carry them.
//!
//! Events are produced only after a room mutation has been committed and
//! travel to one or more [`EventPublisher`]s. Publishing is best-effort: a
//! failing or slow sink never affects the state change that produced it.

mod bus;
mod publisher;
mod types;

pub use bus::EventBus;
pub use publisher::{EventPublisher, PublishError};
pub use types::RoomEvent;
