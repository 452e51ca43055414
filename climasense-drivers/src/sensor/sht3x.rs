//! Sensirion SHT3x temperature/humidity sensor (I2C)
//!
//! # Protocol
//!
//! Every command is a 16-bit word written big-endian. Data comes back in
//! 16-bit words, each followed by a CRC-8 byte:
//!
//! ```text
//! measurement: [T_msb T_lsb T_crc RH_msb RH_lsb RH_crc]
//! status:      [S_msb S_lsb S_crc]
//! ```
//!
//! Single-shot measurements use high repeatability without clock
//! stretching (0x2400). The result is read after the conversion time.
//!
//! # Conversion
//!
//! ```text
//! T  = -45 + 175 * raw / 65535   (°C)
//! RH = 100 * raw / 65535         (%RH)
//! ```

use climasense_hal::{DeviceError, SensorChannel, SensorDevice, SensorValue, MICROS_PER_UNIT};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

/// Address with the ADDR pin tied low
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Address with the ADDR pin tied high
pub const ALTERNATE_ADDRESS: u8 = 0x45;

/// SHT3x commands
pub mod cmd {
    /// Single shot, high repeatability, no clock stretching
    pub const MEASURE_HIGH_REPEATABILITY: u16 = 0x2400;
    /// Read status register
    pub const READ_STATUS: u16 = 0xF32D;
    /// Clear status register
    pub const CLEAR_STATUS: u16 = 0x3041;
    /// Soft reset
    pub const SOFT_RESET: u16 = 0x30A2;
}

/// Worst-case high repeatability conversion time (ms)
pub const MEASUREMENT_TIME_MS: u32 = 16;

/// Soft reset settling time (ms)
const RESET_TIME_MS: u32 = 2;

/// Full scale of a raw reading
const RAW_FULL_SCALE: i64 = 0xFFFF;

/// CRC-8 over a data word
///
/// Polynomial 0x31 (x^8 + x^5 + x^4 + 1), initial value 0xFF.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Extract a word from `[msb, lsb, crc]`, verifying the checksum
pub fn parse_word(chunk: &[u8; 3]) -> Result<u16, DeviceError> {
    if crc8(&chunk[..2]) != chunk[2] {
        return Err(DeviceError::Crc);
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

/// Scale a raw word to `offset + span * raw / 65535`
fn scale(raw: u16, span: i64, offset: i32) -> SensorValue {
    let scaled = raw as i64 * span;
    let major = (scaled / RAW_FULL_SCALE) as i32 + offset;
    let micro = ((scaled % RAW_FULL_SCALE) * MICROS_PER_UNIT as i64 / RAW_FULL_SCALE) as i32;
    SensorValue::new(major, micro)
}

/// Convert a raw temperature word to °C
pub fn convert_temperature(raw: u16) -> SensorValue {
    scale(raw, 175, -45)
}

/// Convert a raw humidity word to %RH
pub fn convert_humidity(raw: u16) -> SensorValue {
    scale(raw, 100, 0)
}

/// Raw words from the last successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Latched {
    temperature: u16,
    humidity: u16,
}

/// SHT3x driver
pub struct Sht3x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    latched: Option<Latched>,
}

impl<I2C: I2c, D: DelayNs> Sht3x<I2C, D> {
    /// Create a driver for the sensor at `address`
    ///
    /// No bus traffic happens until the first call.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            latched: None,
        }
    }

    /// I2C address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Read the 16-bit status register
    pub fn read_status(&mut self) -> Result<u16, DeviceError> {
        self.write_command(cmd::READ_STATUS)?;
        let mut buf = [0u8; 3];
        self.i2c.read(self.address, &mut buf).map_err(map_bus_error)?;
        parse_word(&buf)
    }

    /// Clear the status register alert flags
    pub fn clear_status(&mut self) -> Result<(), DeviceError> {
        self.write_command(cmd::CLEAR_STATUS)
    }

    /// Soft reset; latched values are dropped
    pub fn soft_reset(&mut self) -> Result<(), DeviceError> {
        self.latched = None;
        self.write_command(cmd::SOFT_RESET)?;
        self.delay.delay_ms(RESET_TIME_MS);
        Ok(())
    }

    fn write_command(&mut self, command: u16) -> Result<(), DeviceError> {
        self.i2c
            .write(self.address, &command.to_be_bytes())
            .map_err(map_bus_error)
    }
}

impl<I2C: I2c, D: DelayNs> SensorDevice for Sht3x<I2C, D> {
    fn is_ready(&mut self) -> bool {
        self.read_status().is_ok()
    }

    fn fetch(&mut self) -> Result<(), DeviceError> {
        self.write_command(cmd::MEASURE_HIGH_REPEATABILITY)?;
        self.delay.delay_ms(MEASUREMENT_TIME_MS);

        let mut buf = [0u8; 6];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|err| match err.kind() {
                // Conversion still running
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => DeviceError::Timeout,
                kind => map_error_kind(kind),
            })?;

        let temperature = parse_word(&[buf[0], buf[1], buf[2]])?;
        let humidity = parse_word(&[buf[3], buf[4], buf[5]])?;
        self.latched = Some(Latched {
            temperature,
            humidity,
        });
        Ok(())
    }

    fn channel(&mut self, channel: SensorChannel) -> Result<SensorValue, DeviceError> {
        let latched = self.latched.ok_or(DeviceError::NotReady)?;
        Ok(match channel {
            SensorChannel::AmbientTemperature => convert_temperature(latched.temperature),
            SensorChannel::RelativeHumidity => convert_humidity(latched.humidity),
        })
    }
}

fn map_bus_error<E: embedded_hal::i2c::Error>(err: E) -> DeviceError {
    map_error_kind(err.kind())
}

fn map_error_kind(kind: ErrorKind) -> DeviceError {
    match kind {
        ErrorKind::NoAcknowledge(_) => DeviceError::NotReady,
        _ => DeviceError::Bus,
    }
}
