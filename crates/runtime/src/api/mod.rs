//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on locking, workers, or event delivery.

pub mod errors;
pub mod handle;

pub use errors::{ErrorKind, Result, RuntimeError};
pub use handle::{JoinResponse, RuntimeHandle, RuntimeStats};
