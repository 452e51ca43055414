//! Simulated temperature/humidity source
//!
//! Produces plausible, continuously varying readings without hardware.
//! Two boundary policies are available:
//!
//! - [`BoundaryPolicy::Saturate`]: each tick moves every quantity by
//!   `-step`, `0` or `+step`, chosen from a hash of the tick counter and
//!   the seed, then clamps it into its band.
//! - [`BoundaryPolicy::Wrap`]: each tick adds `step`; a value past the
//!   upper bound restarts at the lower bound (sawtooth).
//!
//! Both are fully deterministic for a given configuration.

use crate::config::{BoundaryPolicy, SimulationConfig};
use crate::sample::{Band, SensorSample, HUMIDITY_BAND, TEMPERATURE_BAND};

/// Slack for accumulated floating-point error when checking the ramp's upper bound
const RAMP_EPSILON: f64 = 1e-9;

/// Salts keeping temperature and humidity walks independent
const TEMPERATURE_SALT: u32 = 0x7E4A_51C3;
const HUMIDITY_SALT: u32 = 0x2D9B_08F1;

/// Running simulator values, carried from one tick to the next
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulationState {
    /// Last produced temperature (°C)
    pub temperature_c: f64,
    /// Last produced humidity (%RH)
    pub humidity_rh: f64,
    /// Number of samples produced so far
    pub ticks: u32,
}

/// Simulated sample source
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    config: SimulationConfig,
    state: SimulationState,
}

impl SimulatedSource {
    /// Create a simulator starting from the configured values
    ///
    /// Starting values outside their band are clamped into it.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            state: SimulationState {
                temperature_c: TEMPERATURE_BAND.clamp(config.initial_temperature_c),
                humidity_rh: HUMIDITY_BAND.clamp(config.initial_humidity_rh),
                ticks: 0,
            },
            config,
        }
    }

    /// Active boundary policy
    pub fn policy(&self) -> BoundaryPolicy {
        self.config.policy
    }

    /// Current simulator state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Advance the simulation by one tick and return the new sample
    pub fn next(&mut self) -> SensorSample {
        let counter = self.state.ticks;
        let seed = self.config.seed;

        let (temperature_c, humidity_rh) = match self.config.policy {
            BoundaryPolicy::Saturate => (
                walk(
                    self.state.temperature_c,
                    self.config.temperature_step,
                    direction(counter, seed, TEMPERATURE_SALT),
                    TEMPERATURE_BAND,
                ),
                walk(
                    self.state.humidity_rh,
                    self.config.humidity_step,
                    direction(counter, seed, HUMIDITY_SALT),
                    HUMIDITY_BAND,
                ),
            ),
            BoundaryPolicy::Wrap => (
                ramp(
                    self.state.temperature_c,
                    self.config.temperature_step,
                    TEMPERATURE_BAND,
                ),
                ramp(
                    self.state.humidity_rh,
                    self.config.humidity_step,
                    HUMIDITY_BAND,
                ),
            ),
        };

        self.state = SimulationState {
            temperature_c,
            humidity_rh,
            ticks: counter.wrapping_add(1),
        };

        let sample = SensorSample::new(temperature_c, humidity_rh);
        trace!("Simulated sample #{}: {}", counter, sample);
        sample
    }
}

/// Walk direction (-1, 0 or +1) derived from the tick counter
fn direction(counter: u32, seed: u32, salt: u32) -> i8 {
    (mix32(counter ^ seed.rotate_left(7) ^ salt) % 3) as i8 - 1
}

/// 32-bit avalanche mix (MurmurHash3 finalizer)
fn mix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Saturating walk step
fn walk(value: f64, step: f64, direction: i8, band: Band) -> f64 {
    band.clamp(value + step * direction as f64)
}

/// Wrapping ramp step
fn ramp(value: f64, step: f64, band: Band) -> f64 {
    let next = value + step;
    if next > band.hi + RAMP_EPSILON {
        band.lo
    } else {
        band.clamp(next)
    }
}
