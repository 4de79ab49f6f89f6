//! The data line capability.
//!
//! The sensor shares one wire for both directions: the host drives the wake
//! pulse, then lets go of the line and listens. [`DataPin`] adds that
//! direction switch on top of the `embedded-hal` digital traits.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The host listens; the sensor (or the pull-up) sets the level.
    Input,
    /// The host drives the level.
    Output,
}

/// A GPIO line that can be read, written and switched between directions.
pub trait DataPin: InputPin + OutputPin {
    /// Switches the line direction.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

impl<T: DataPin + ?Sized> DataPin for &mut T {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        T::set_direction(self, direction)
    }
}

/// Adapter for open-drain pins with an external pull-up.
///
/// An open-drain output can only pull the line low, so reading it back is
/// always possible and "input mode" just means releasing the line high.
/// Switching to [`Direction::Output`] needs no action.
#[derive(Debug)]
pub struct OpenDrain<P> {
    pin: P,
}

impl<P> OpenDrain<P> {
    /// Wraps an open-drain pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}

impl<P: InputPin + OutputPin> DataPin for OpenDrain<P> {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Input => self.pin.set_high(),
            Direction::Output => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTx,
    };

    #[test]
    fn test_input_direction_releases_the_line() {
        let mut pin = PinMock::new(&[PinTx::set(PinState::High)]);

        let mut line = OpenDrain::new(pin.clone());
        line.set_direction(Direction::Output).unwrap();
        line.set_direction(Direction::Input).unwrap();

        pin.done();
    }

    #[test]
    fn test_reads_and_writes_pass_through() {
        let pin = PinMock::new(&[
            PinTx::set(PinState::Low),
            PinTx::get(PinState::Low),
            PinTx::get(PinState::High),
        ]);

        let mut line = OpenDrain::new(pin);
        line.set_low().unwrap();
        assert!(line.is_low().unwrap());
        assert!(line.is_high().unwrap());

        line.into_inner().done();
    }
}
