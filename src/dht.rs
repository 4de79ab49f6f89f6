use embedded_hal::delay::DelayNs;

use crate::error::DhtError;
use crate::pin::{DataPin, Direction};
use crate::priority::{NoPriority, PriorityGuard, SchedulingPriority};
use crate::pulse::{DHT_PULSES, Pulses};
use crate::reading::Reading;
use crate::retry::RetryPolicy;

/// Maximum number of polls the line may stay at one level.
///
/// Used to detect timeouts when waiting for the sensor to respond or to
/// finish a pulse.
pub const DHT_MAXCOUNT: u32 = 32_000;

/// How long the line is held high before the start signal (milliseconds).
pub const WAKE_HIGH_MS: u32 = 500;

/// Length of the start signal (milliseconds).
pub const WAKE_LOW_MS: u32 = 20;

/// Spin iterations between releasing the line and the first read. Without
/// it the first read can still see the start signal's low level.
pub const SETTLE_SPINS: u32 = 50;

/// Driver for DHT11/DHT22 sensors on a bit-banged GPIO line.
///
/// * `PIN` - the data line.
/// * `SLEEP` - a delay that may yield, for the long wake hold.
/// * `SPIN` - a busy-waiting delay, for the start signal.
/// * `PRIO` - scheduling priority control for the capture.
pub struct Dht<PIN, SLEEP, SPIN, PRIO = NoPriority> {
    pin: PIN,
    sleep: SLEEP,
    spin: SPIN,
    priority: PRIO,
    max_count: u32,
}

impl<PIN, SLEEP, SPIN> Dht<PIN, SLEEP, SPIN> {
    /// Creates a driver that leaves the scheduling priority alone.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the sensor data line.
    /// * `sleep` - Delay used for the 500 ms wake hold; may yield.
    /// * `spin` - Delay used for the 20 ms start signal; must not yield.
    pub fn new(pin: PIN, sleep: SLEEP, spin: SPIN) -> Self {
        Self::with_priority(pin, sleep, spin, NoPriority)
    }
}

impl<PIN, SLEEP, SPIN, PRIO> Dht<PIN, SLEEP, SPIN, PRIO> {
    /// Creates a driver that runs the capture under elevated priority.
    pub fn with_priority(pin: PIN, sleep: SLEEP, spin: SPIN, priority: PRIO) -> Self {
        Dht {
            pin,
            sleep,
            spin,
            priority,
            max_count: DHT_MAXCOUNT,
        }
    }

    /// Overrides the per-level poll bound (default [`DHT_MAXCOUNT`]).
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    /// Releases the pin, the delays and the priority control.
    pub fn release(self) -> (PIN, SLEEP, SPIN, PRIO) {
        (self.pin, self.sleep, self.spin, self.priority)
    }
}

impl<PIN, SLEEP, SPIN, PRIO, E> Dht<PIN, SLEEP, SPIN, PRIO>
where
    PIN: DataPin<Error = E>,
    SLEEP: DelayNs,
    SPIN: DelayNs,
    PRIO: SchedulingPriority,
{
    /// Performs one complete exchange with the sensor.
    ///
    /// Sends the wake sequence, captures the 41 response pulses under
    /// elevated priority, decodes them and validates the checksum. Takes a
    /// little over 520 ms whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the transmission was received and the checksum is valid.
    /// * `Err(DhtError)` on timeout, checksum mismatch or pin failure.
    pub fn attempt_read(&mut self) -> Result<Reading, DhtError<E>> {
        self.wake()?;

        let captured = {
            let _priority = PriorityGuard::new(&mut self.priority);
            Self::capture(&mut self.pin, self.max_count)
        };

        let pulses = match captured {
            Ok(pulses) => pulses,
            Err(e) => {
                match &e {
                    DhtError::Timeout => debug!("timeout waiting for the sensor"),
                    DhtError::PinError(_) => debug!("pin error during capture"),
                    DhtError::ChecksumMismatch => {}
                }
                return Err(e);
            }
        };

        match pulses.decode() {
            Ok(reading) => {
                debug!(
                    "humidity = {} %, temperature = {} C ({} F)",
                    reading.relative_humidity, reading.celsius, reading.fahrenheit
                );
                Ok(reading)
            }
            Err(e) => {
                debug!("checksum mismatch, discarding data");
                Err(e)
            }
        }
    }

    /// Calls [`attempt_read`](Self::attempt_read) until it succeeds or
    /// `policy` runs out of attempts, sleeping the cool-down in between.
    ///
    /// Pin errors are returned straight away: they point at the wiring or the
    /// HAL, which another attempt will not fix.
    ///
    /// # Errors
    ///
    /// The error of the last attempt.
    pub fn read_with_retry(&mut self, policy: RetryPolicy) -> Result<Reading, DhtError<E>> {
        let mut attempt = 1;
        loop {
            match self.attempt_read() {
                Ok(reading) => return Ok(reading),
                Err(e @ DhtError::PinError(_)) => return Err(e),
                Err(e) if attempt >= policy.max_attempts() => return Err(e),
                Err(_) => {
                    debug!("attempt {} failed, retrying", attempt);
                    self.sleep.delay_ms(policy.cooldown_ms());
                    attempt += 1;
                }
            }
        }
    }

    /// Sends the start signal.
    ///
    /// The line is held high for 500 ms so the sensor sees a clean idle
    /// level, then pulled low for 20 ms. The low hold is busy-waited: a
    /// sleep that overshoots by a scheduler tick would be mistaken for a
    /// different signal.
    fn wake(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_direction(Direction::Output)?;
        self.pin.set_high()?;
        self.sleep.delay_ms(WAKE_HIGH_MS);

        self.pin.set_low()?;
        self.spin.delay_ms(WAKE_LOW_MS);
        Ok(())
    }

    /// Releases the line and records the width of every response pulse.
    ///
    /// Timing critical: nothing in here may log or block.
    fn capture(pin: &mut PIN, max_count: u32) -> Result<Pulses, DhtError<E>> {
        pin.set_direction(Direction::Input)?;
        for _ in 0..SETTLE_SPINS {
            core::hint::spin_loop();
        }

        // Wait for the sensor to pull the line low
        Self::count_while_high(pin, max_count)?;

        let mut pulses = Pulses::default();
        for i in 0..DHT_PULSES {
            let low = Self::count_while_low(pin, max_count)?;
            let high = Self::count_while_high(pin, max_count)?;
            pulses.record(i, low, high);
        }
        Ok(pulses)
    }

    fn count_while_high(pin: &mut PIN, max_count: u32) -> Result<u32, DhtError<E>> {
        Self::count_while(max_count, || pin.is_high())
    }

    fn count_while_low(pin: &mut PIN, max_count: u32) -> Result<u32, DhtError<E>> {
        Self::count_while(max_count, || pin.is_low())
    }

    /// Polls `condition` until it turns false, returning how many polls it
    /// held for.
    ///
    /// # Errors
    ///
    /// Returns `DhtError::Timeout` once the condition has held for
    /// `max_count` polls.
    fn count_while<F>(max_count: u32, mut condition: F) -> Result<u32, DhtError<E>>
    where
        F: FnMut() -> Result<bool, E>,
    {
        let mut count = 0;
        while condition()? {
            count += 1;
            if count >= max_count {
                return Err(DhtError::Timeout);
            }
        }
        Ok(count)
    }
}
