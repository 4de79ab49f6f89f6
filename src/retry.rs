//! Caller-side retry policy.
//!
//! A single attempt fails routinely: a preemption during capture corrupts
//! the pulse widths. The sensor also needs about two seconds between
//! conversions, so retries are spaced by a cool-down.

/// How [`Dht::read_with_retry`](crate::Dht::read_with_retry) retries.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u8,
    cooldown_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown_ms: 3000,
        }
    }
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` attempts (at least one),
    /// sleeping `cooldown_ms` after each failed one.
    pub const fn new(max_attempts: u8, cooldown_ms: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            cooldown_ms,
        }
    }

    /// Upper bound on read attempts, never zero.
    pub const fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    /// Pause between a failed attempt and the next one, in milliseconds.
    pub const fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }
}
