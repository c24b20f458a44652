//! Worker tasks that back the runtime orchestration.
//!
//! Room transitions run on the caller's task under the room lock; delivery of
//! their events is offloaded to the publish worker.

mod publish;

pub use publish::PublishQueue;
