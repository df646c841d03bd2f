//! Blocking delays between rounds.
//!
//! The loop has no timers of its own; it only ever blocks for a fixed
//! duration. Tests swap in a recording sleeper so nothing actually waits.

use std::thread;
use std::time::Duration;

use tracing::debug;

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        debug!(
            millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "sleeping"
        );
        thread::sleep(duration);
    }
}
