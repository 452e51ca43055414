//! Sensor device abstractions
//!
//! Models peripherals that sample all of their channels at once (`fetch`)
//! and then hand out the latched values one channel at a time (`channel`).

use core::fmt;

/// Micro-units per whole physical unit
pub const MICROS_PER_UNIT: i32 = 1_000_000;

/// Measurement channels exposed by a sensor device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorChannel {
    /// Ambient temperature in degrees Celsius
    AmbientTemperature,
    /// Relative humidity in percent
    RelativeHumidity,
}

/// Errors reported by a sensor device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Device did not respond or is not initialized
    NotReady,
    /// Bus transaction failed (NACK, arbitration loss, ...)
    Bus,
    /// Device did not finish a measurement in time
    Timeout,
    /// Received data failed its checksum
    Crc,
    /// Device does not provide the requested channel
    UnsupportedChannel,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotReady => f.write_str("device not ready"),
            DeviceError::Bus => f.write_str("bus error"),
            DeviceError::Timeout => f.write_str("measurement timeout"),
            DeviceError::Crc => f.write_str("checksum mismatch"),
            DeviceError::UnsupportedChannel => f.write_str("unsupported channel"),
        }
    }
}

/// A channel reading split into an integer part and a fractional part
///
/// The fractional part is expressed in millionths of one physical unit,
/// so 23.5°C is `SensorValue { major: 23, micro: 500_000 }`.
/// Both parts carry their own sign; the value is always `major + micro / 1e6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorValue {
    /// Whole units
    pub major: i32,
    /// Millionths of a unit
    pub micro: i32,
}

impl SensorValue {
    /// Create a value from its two parts
    pub const fn new(major: i32, micro: i32) -> Self {
        Self { major, micro }
    }

    /// Combine both parts into a floating-point value
    pub fn to_f64(self) -> f64 {
        self.major as f64 + self.micro as f64 / MICROS_PER_UNIT as f64
    }
}

/// A sensor peripheral using the fetch-then-read access pattern
///
/// Takes `&mut self` everywhere because bus access requires mutable access.
pub trait SensorDevice {
    /// Check whether the device is present and able to take measurements
    fn is_ready(&mut self) -> bool;

    /// Trigger a measurement and latch the results for every channel
    fn fetch(&mut self) -> Result<(), DeviceError>;

    /// Read the latched value of one channel
    ///
    /// Returns the value from the most recent successful [`fetch`](Self::fetch).
    fn channel(&mut self, channel: SensorChannel) -> Result<SensorValue, DeviceError>;
}

impl<T: SensorDevice + ?Sized> SensorDevice for &mut T {
    fn is_ready(&mut self) -> bool {
        T::is_ready(self)
    }

    fn fetch(&mut self) -> Result<(), DeviceError> {
        T::fetch(self)
    }

    fn channel(&mut self, channel: SensorChannel) -> Result<SensorValue, DeviceError> {
        T::channel(self, channel)
    }
}
