use chrono::Utc;

use checkers_core::Timestamp;

/// Wall-clock source for join and creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch clocks clamp to zero.
        Timestamp(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }
}
