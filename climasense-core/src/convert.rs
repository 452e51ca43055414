//! Conversion from physical units to the attribute store's fixed-point units
//!
//! Values are scaled by 100 and rounded to the nearest integer, ties away
//! from zero. `f64::round` is not available in `core`, so rounding splits
//! off the integer part with a truncating cast and inspects the remainder.
//! Results outside the target integer range saturate instead of wrapping.

use crate::sample::{SensorSample, WireReading};

/// Scale factor between physical units and centi-units
pub const CENTI_SCALE: f64 = 100.0;

/// Round to the nearest integer, ties away from zero
///
/// NaN maps to 0 and infinities saturate, following `as` cast semantics.
pub fn round_half_away(value: f64) -> i64 {
    let whole = value as i64;
    // Exact: the fractional part of a double is itself representable
    let fraction = value - whole as f64;

    if fraction >= 0.5 {
        whole.saturating_add(1)
    } else if fraction <= -0.5 {
        whole.saturating_sub(1)
    } else {
        whole
    }
}

/// Convert a physical value to saturated signed centi-units
pub fn to_centi_i16(value: f64) -> i16 {
    round_half_away(value * CENTI_SCALE).clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Convert a physical value to saturated unsigned centi-units
pub fn to_centi_u16(value: f64) -> u16 {
    round_half_away(value * CENTI_SCALE).clamp(0, u16::MAX as i64) as u16
}

/// Map a sample to its wire representation
///
/// Pure and stateless: identical samples always produce identical readings.
pub fn to_wire(sample: SensorSample) -> WireReading {
    WireReading {
        temperature_centi: to_centi_i16(sample.temperature_c),
        humidity_centi: to_centi_u16(sample.humidity_rh),
    }
}
