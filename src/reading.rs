use crate::error::DhtError;

/// Humidity above this is not a fixed-point DHT22 value; the sensor is a
/// DHT11-style part reporting whole percent in the high byte.
const HUMIDITY_MAX: f32 = 100.0;

/// Same cut-off for temperature, in degrees Celsius.
const TEMPERATURE_MAX: f32 = 125.0;

/// The five bytes of one transmission: humidity high/low, temperature
/// high/low and the checksum.
///
/// Bit 7 of the temperature high byte is the sign flag.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame([u8; 5]);

impl Frame {
    /// Wraps five received bytes, checksum last.
    pub const fn new(bytes: [u8; 5]) -> Self {
        Frame(bytes)
    }

    /// The raw bytes, checksum included.
    pub const fn bytes(&self) -> [u8; 5] {
        self.0
    }

    /// Sum of the four payload bytes, modulo 256.
    pub fn expected_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Whether the transmitted checksum matches the payload.
    pub fn is_valid(&self) -> bool {
        self.expected_checksum() == self.0[4]
    }

    /// Validates the checksum and converts the payload into a [`Reading`].
    ///
    /// # Errors
    ///
    /// Returns `DhtError::ChecksumMismatch` if the transmitted checksum does
    /// not match the payload. No part of the payload is interpreted in that
    /// case.
    pub fn reading<E>(&self) -> Result<Reading, DhtError<E>> {
        if !self.is_valid() {
            return Err(DhtError::ChecksumMismatch);
        }
        let [hum_hi, hum_lo, temp_hi, temp_lo, _] = self.0;
        Ok(Reading::from_payload([hum_hi, hum_lo, temp_hi, temp_lo]))
    }
}

/// Calibrated measurement decoded from a valid frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Relative humidity in percent.
    pub relative_humidity: f32,
    /// Temperature in degrees Celsius.
    pub celsius: f32,
    /// Temperature in degrees Fahrenheit, derived from `celsius`.
    pub fahrenheit: f32,
}

impl Reading {
    /// Converts the 4 payload bytes into a `Reading`.
    ///
    /// DHT22 parts send tenths in a 16-bit word; DHT11 parts send whole
    /// units in the high byte. A word that decodes out of range is taken
    /// to be the latter.
    fn from_payload(data: [u8; 4]) -> Self {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = data;

        let mut relative_humidity = u16::from_be_bytes([hum_hi, hum_lo]) as f32 / 10.0;
        if relative_humidity > HUMIDITY_MAX {
            relative_humidity = hum_hi as f32;
        }

        let is_temp_negative = (temp_hi >> 7) != 0;
        let joined_temp = u16::from_be_bytes([temp_hi & 0b0111_1111, temp_lo]);
        let mut celsius = joined_temp as f32 / 10.0;
        if celsius > TEMPERATURE_MAX {
            celsius = temp_hi as f32;
        }
        if is_temp_negative {
            celsius = -celsius;
        }

        Reading {
            relative_humidity,
            celsius,
            fahrenheit: celsius * 1.8 + 32.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bytes: [u8; 5]) -> Result<Reading, DhtError<()>> {
        Frame::new(bytes).reading()
    }

    #[test]
    fn test_checksum_wraps() {
        let frame = Frame::new([0xFF, 0x01, 0x80, 0x02, 0x82]);
        assert_eq!(frame.expected_checksum(), 0x82);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_positive_temperature() {
        let reading = read([0x02, 0x0A, 0x01, 0x05, 0x12]).unwrap();

        assert_eq!(reading.relative_humidity, 52.2);
        assert_eq!(reading.celsius, 26.1);
        assert_eq!(reading.fahrenheit, reading.celsius * 1.8 + 32.0);
        assert!((reading.fahrenheit - 78.98).abs() < 1e-3);
    }

    #[test]
    fn test_negative_temperature() {
        // (0x02 + 0x0A + 0x81 + 0x05) & 0xFF = 0x92
        let reading = read([0x02, 0x0A, 0x81, 0x05, 0x92]).unwrap();

        assert_eq!(reading.celsius, -26.1);
        assert_eq!(reading.fahrenheit, reading.celsius * 1.8 + 32.0);
        assert!((reading.fahrenheit - (-14.98)).abs() < 1e-3);
    }

    #[test]
    fn test_checksum_mismatch() {
        assert_eq!(
            read([0x02, 0x0A, 0x01, 0x05, 0x13]),
            Err(DhtError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_single_byte_variant() {
        // DHT11: 60 %, 25 C in the high bytes only
        let reading = read([0x3C, 0x00, 0x19, 0x00, 0x55]).unwrap();

        assert_eq!(reading.relative_humidity, 60.0);
        assert_eq!(reading.celsius, 25.0);
        assert_eq!(reading.fahrenheit, 77.0);
    }

    #[test]
    fn test_fallback_keeps_the_sign_byte() {
        // magnitude 0x0500 -> 128.0 C is out of range, 0x85 is taken whole
        let reading = read([0x01, 0x90, 0x85, 0x00, 0x16]).unwrap();

        assert_eq!(reading.relative_humidity, 40.0);
        assert_eq!(reading.celsius, -133.0);
    }

    #[test]
    fn test_limits_are_inclusive() {
        // 1000 -> 100.0 %, 1250 -> 125.0 C
        let reading = read([0x03, 0xE8, 0x04, 0xE2, 0xD1]).unwrap();

        assert_eq!(reading.relative_humidity, 100.0);
        assert_eq!(reading.celsius, 125.0);
    }
}
