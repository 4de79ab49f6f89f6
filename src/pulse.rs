//! Captured pulse widths and their conversion into a [`Frame`].

use crate::error::DhtError;
use crate::reading::{Frame, Reading};

/// Number of low/high pulse pairs in one transmission: the acknowledgment
/// pulse followed by 40 data bits.
pub const DHT_PULSES: usize = 41;

/// Low and high widths of every pulse in one transmission, in polling
/// iterations.
///
/// The counts are not converted to real time. Only their ratio matters:
/// each data bit starts with a ~50us low phase, followed by a high phase of
/// ~28us for a zero or ~70us for a one.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulses {
    low: [u32; DHT_PULSES],
    high: [u32; DHT_PULSES],
}

impl Default for Pulses {
    fn default() -> Self {
        Pulses {
            low: [0; DHT_PULSES],
            high: [0; DHT_PULSES],
        }
    }
}

impl Pulses {
    /// Builds pulses from recorded widths. Index 0 is the acknowledgment.
    pub const fn new(low: [u32; DHT_PULSES], high: [u32; DHT_PULSES]) -> Self {
        Pulses { low, high }
    }

    /// Low-phase widths; index 0 is the acknowledgment pulse.
    pub const fn low(&self) -> &[u32; DHT_PULSES] {
        &self.low
    }

    /// High-phase widths; indices 1..=40 carry the data bits.
    pub const fn high(&self) -> &[u32; DHT_PULSES] {
        &self.high
    }

    /// Stores the widths of pulse `index`.
    pub(crate) fn record(&mut self, index: usize, low: u32, high: u32) {
        self.low[index] = low;
        self.high[index] = high;
    }

    /// Mean width of the 40 data-bit low phases, rounded down.
    ///
    /// Every data bit starts with the same ~50us low phase, which makes it
    /// a reference for telling the short and long high phases apart. The
    /// 80us acknowledgment pulse is left out.
    pub fn threshold(&self) -> u32 {
        let sum: u64 = self.low[1..].iter().map(|&w| u64::from(w)).sum();
        (sum / (DHT_PULSES as u64 - 1)) as u32
    }

    /// Decodes the 40 data bits, MSB first, into five bytes.
    ///
    /// A high phase at least as wide as [`threshold`](Self::threshold) is a
    /// one, anything shorter a zero.
    pub fn frame(&self) -> Frame {
        let threshold = self.threshold();
        let mut bytes = [0u8; 5];

        for (i, &width) in self.high[1..].iter().enumerate() {
            let byte = &mut bytes[i / 8];
            *byte <<= 1;
            if width >= threshold {
                *byte |= 1;
            }
        }

        trace!("threshold: {}", threshold);
        Frame::new(bytes)
    }

    /// Decodes, validates and calibrates the transmission.
    ///
    /// # Errors
    ///
    /// `DhtError::ChecksumMismatch` if the decoded checksum byte is wrong.
    pub fn decode<E>(&self) -> Result<Reading, DhtError<E>> {
        let frame = self.frame();
        debug!("data: {:?}", frame.bytes());
        frame.reading()
    }
}
