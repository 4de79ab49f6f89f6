use core::fmt;

/// Possible errors from a read attempt.
///
/// Every variant is recoverable: callers are expected to wait a couple of
/// seconds and try again.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The line did not change state within the iteration bound.
    ///
    /// Either the sensor never answered the wake pulse or it stalled
    /// mid-transmission.
    Timeout,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timed out waiting for the sensor"),
            Self::ChecksumMismatch => f.write_str("checksum mismatch"),
            Self::PinError(e) => write!(f, "pin error: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DhtError<E> {}
