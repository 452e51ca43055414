//! Sensor provider
//!
//! The scheduler talks to exactly one sample source through the
//! [`SensorProvider`] trait. Which one is decided once, at startup, from
//! the node configuration.

use climasense_hal::SensorDevice;

use super::hardware::HardwareSource;
use super::simulated::SimulatedSource;
use crate::config::{ConfigError, NodeConfig, SourceMode};
use crate::sample::SensorSample;

/// Something that yields one sample per tick
///
/// Producing a sample never fails; sources absorb their own errors.
pub trait SensorProvider {
    /// Produce the next sample
    fn produce(&mut self) -> SensorSample;
}

impl<T: SensorProvider + ?Sized> SensorProvider for &mut T {
    fn produce(&mut self) -> SensorSample {
        T::produce(self)
    }
}

impl SensorProvider for SimulatedSource {
    fn produce(&mut self) -> SensorSample {
        self.next()
    }
}

impl<D: SensorDevice> SensorProvider for HardwareSource<D> {
    fn produce(&mut self) -> SensorSample {
        self.next_or_fallback()
    }
}

/// The configured sample source
#[derive(Debug)]
pub enum ActiveSource<D> {
    /// Synthetic readings
    Simulated(SimulatedSource),
    /// Physical sensor with fallback
    Hardware(HardwareSource<D>),
}

impl<D: SensorDevice> ActiveSource<D> {
    /// Build the source selected by `config`
    ///
    /// Validates the configuration first; a [`ConfigError`] here must keep
    /// the acquisition task from starting. In hardware mode the device is
    /// initialized with a warm-up read, whose failure is logged and
    /// tolerated. `device` is dropped in simulated mode.
    pub fn from_config(config: &NodeConfig, device: Option<D>) -> Result<Self, ConfigError> {
        config.validate()?;

        match config.source {
            SourceMode::Simulated => {
                let source = SimulatedSource::new(config.simulation);
                info!("Sample source: simulated ({:?})", source.policy());
                Ok(ActiveSource::Simulated(source))
            }
            SourceMode::Hardware => {
                info!("Sample source: hardware");
                let mut source = HardwareSource::new(device);
                // Degraded mode on failure; already logged by init
                let _ = source.init();
                Ok(ActiveSource::Hardware(source))
            }
        }
    }

    /// Mode of the active source
    pub fn mode(&self) -> SourceMode {
        match self {
            ActiveSource::Simulated(_) => SourceMode::Simulated,
            ActiveSource::Hardware(_) => SourceMode::Hardware,
        }
    }
}

impl<D: SensorDevice> SensorProvider for ActiveSource<D> {
    fn produce(&mut self) -> SensorSample {
        match self {
            ActiveSource::Simulated(source) => source.produce(),
            ActiveSource::Hardware(source) => source.produce(),
        }
    }
}
