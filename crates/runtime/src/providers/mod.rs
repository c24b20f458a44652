//! Sources of non-determinism injected into the runtime.
//!
//! `checkers-core` never reads a clock or draws random numbers. The runtime
//! supplies both through these traits so tests can pin them down.

mod clock;
mod ids;

pub use clock::{Clock, SystemClock};
pub use ids::{IdProvider, RandomIds};
