//! Sensor samples and their fixed-point wire form

use core::fmt;

/// A closed range `[lo, hi]` a simulated quantity is kept within
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    /// Lower bound (inclusive)
    pub lo: f64,
    /// Upper bound (inclusive)
    pub hi: f64,
}

impl Band {
    /// Create a band; `lo` must not exceed `hi`
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Check whether `value` lies within the band
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Clamp `value` into the band
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.lo {
            self.lo
        } else if value > self.hi {
            self.hi
        } else {
            value
        }
    }
}

/// Temperature band for simulated readings (°C)
pub const TEMPERATURE_BAND: Band = Band::new(20.0, 30.0);

/// Relative humidity band for simulated readings (%RH)
pub const HUMIDITY_BAND: Band = Band::new(40.0, 60.0);

/// One temperature/humidity measurement in physical units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity in percent
    pub humidity_rh: f64,
}

impl SensorSample {
    /// Reading substituted when the hardware sensor is unavailable or fails
    pub const FALLBACK: Self = Self::new(20.0, 40.0);

    /// Create a sample
    pub const fn new(temperature_c: f64, humidity_rh: f64) -> Self {
        Self {
            temperature_c,
            humidity_rh,
        }
    }

    /// Check the sample against the simulation bands
    pub fn within_bands(&self) -> bool {
        TEMPERATURE_BAND.contains(self.temperature_c) && HUMIDITY_BAND.contains(self.humidity_rh)
    }
}

impl fmt::Display for SensorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&crate::convert::to_wire(*self), f)
    }
}

/// Fixed-point reading in hundredths of a unit, as stored in the attribute store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WireReading {
    /// Temperature in 0.01°C units (2534 = 25.34°C)
    pub temperature_centi: i16,
    /// Relative humidity in 0.01% units (4875 = 48.75%)
    pub humidity_centi: u16,
}

impl WireReading {
    /// Create a reading from raw centi values
    pub const fn new(temperature_centi: i16, humidity_centi: u16) -> Self {
        Self {
            temperature_centi,
            humidity_centi,
        }
    }

    /// Temperature back in degrees Celsius
    pub fn temperature_c(&self) -> f64 {
        self.temperature_centi as f64 / 100.0
    }

    /// Humidity back in percent
    pub fn humidity_rh(&self) -> f64 {
        self.humidity_centi as f64 / 100.0
    }
}

/// Write a centi value as `int.frac` with two fractional digits
fn write_centi(f: &mut fmt::Formatter<'_>, centi: i32) -> fmt::Result {
    let sign = if centi < 0 { "-" } else { "" };
    let abs = centi.unsigned_abs();
    write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
}

impl fmt::Display for WireReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_centi(f, self.temperature_centi as i32)?;
        f.write_str("°C / ")?;
        write_centi(f, self.humidity_centi as i32)?;
        f.write_str("%RH")
    }
}
