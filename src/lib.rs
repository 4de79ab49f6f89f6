//! DHT11/DHT22 Pulse Decoder for Embedded Rust
//!
//! This crate reads DHT11 and DHT22 (AM2302) temperature and humidity
//! sensors over a bit-banged single-wire GPIO line, built on top of the
//! [`embedded-hal`] traits.
//!
//! Instead of sampling each bit at a fixed delay, the driver counts how many
//! polls the line spends low and high for every pulse of the transmission
//! and decides each bit against the average low width. That makes it work
//! on hosts where polling speed is unknown, such as a Raspberry Pi running
//! Linux, as long as the capture is not preempted.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Handles both the DHT22 fixed-point format and the DHT11 whole-unit format
//! - Scoped real-time priority elevation during the capture
//!
//! # Usage
//!
//! ```ignore
//! use dht_pulse::{Dht, OpenDrain, RetryPolicy};
//! use dht_pulse::host::{RealtimeScheduler, SpinDelay};
//!
//! let mut dht = Dht::with_priority(OpenDrain::new(pin), sleep, SpinDelay, RealtimeScheduler);
//! let reading = dht.read_with_retry(RetryPolicy::default())?;
//! println!("{:.1} % {:.1} C", reading.relative_humidity, reading.celsius);
//! ```
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade
//! - `std`: Host helpers in `host`: a busy-wait delay and `SCHED_FIFO`
//!   priority elevation (Linux)
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub mod dht;
pub mod error;
#[cfg(feature = "std")]
pub mod host;
pub mod pin;
pub mod priority;
pub mod pulse;
pub mod reading;
pub mod retry;

pub use dht::{DHT_MAXCOUNT, Dht};
pub use error::DhtError;
pub use pin::{DataPin, Direction, OpenDrain};
pub use priority::{NoPriority, PriorityGuard, SchedulingPriority};
pub use pulse::{DHT_PULSES, Pulses};
pub use reading::{Frame, Reading};
pub use retry::RetryPolicy;
