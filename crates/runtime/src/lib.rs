//! Runtime orchestration for checkers rooms.
//!
//! This crate wraps the pure rules in `checkers-core` with everything a live
//! service needs: a concurrent room registry, injected clock and id sources,
//! and best-effort event publishing. Consumers embed [`Runtime`] and drive
//! rooms through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream transports interact with
//! - [`events`] defines room events, the publisher seam and the in-process bus
//! - [`providers`] supplies time and identifiers
//! - [`registry`] owns the rooms and their locks
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod registry;
pub mod runtime;

mod workers;

pub use api::{ErrorKind, JoinResponse, Result, RuntimeError, RuntimeHandle, RuntimeStats};
pub use events::{EventBus, EventPublisher, PublishError, RoomEvent};
pub use providers::{Clock, IdProvider, RandomIds, SystemClock};
pub use registry::RoomRegistry;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
