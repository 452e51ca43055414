//! Configuration type definitions
//!
//! These types describe one sensor node. They are built from `node.toml`
//! (see [`super::parse_config`]) and validated once at startup; nothing in
//! here changes after the acquisition task has been spawned.

use core::fmt;

use crate::publish::EndpointId;
use crate::sample::{HUMIDITY_BAND, TEMPERATURE_BAND};

/// Largest per-tick step the saturating walk may take (physical units)
pub const MAX_WALK_STEP: f64 = 0.5;

/// Default I2C address of an SHT3x with ADDR tied low
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x44;

/// Which sample source backs the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceMode {
    /// Synthetic readings, no peripheral required
    #[default]
    Simulated,
    /// Readings from the physical sensor peripheral
    Hardware,
}

/// The two mutually exclusive source switches as written in the config
///
/// Exactly one of them must be set; see [`SourceSelection::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceSelection {
    /// Use the simulated source
    pub simulated: bool,
    /// Use the hardware source
    pub hardware: bool,
}

impl SourceSelection {
    /// Resolve the switches to a single source mode
    pub fn resolve(self) -> Result<SourceMode, ConfigError> {
        match (self.simulated, self.hardware) {
            (true, false) => Ok(SourceMode::Simulated),
            (false, true) => Ok(SourceMode::Hardware),
            (true, true) => Err(ConfigError::MultipleSourcesSelected),
            (false, false) => Err(ConfigError::NoSourceSelected),
        }
    }
}

/// What the simulator does when a value reaches the edge of its band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoundaryPolicy {
    /// Random walk; values that would leave the band stick at the bound
    #[default]
    Saturate,
    /// Fixed positive ramp; values past the upper bound restart at the lower bound
    Wrap,
}

/// Simulated source configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulationConfig {
    /// Boundary policy
    pub policy: BoundaryPolicy,
    /// Starting temperature (°C)
    pub initial_temperature_c: f64,
    /// Starting humidity (%RH)
    pub initial_humidity_rh: f64,
    /// Temperature step per tick (°C); walk magnitude or ramp increment
    pub temperature_step: f64,
    /// Humidity step per tick (%RH); walk magnitude or ramp increment
    pub humidity_step: f64,
    /// Seed mixed into the walk's counter-derived direction
    pub seed: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: BoundaryPolicy::Saturate,
            initial_temperature_c: 25.0,
            initial_humidity_rh: 50.0,
            temperature_step: 0.1,
            humidity_step: 0.5,
            seed: 0,
        }
    }
}

/// Acquisition scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Wait before the first tick so the attribute store can come up (ms)
    pub startup_grace_ms: u32,
    /// Sleep between ticks (ms)
    pub period_ms: u32,
    /// Consecutive failed ticks before publishing is reported degraded
    /// (`None` disables the health signal)
    pub degraded_after: Option<u16>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            startup_grace_ms: 5_000,
            period_ms: 10_000,
            degraded_after: Some(6),
        }
    }
}

/// Physical sensor wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorHwConfig {
    /// 7-bit I2C address
    pub i2c_address: u8,
}

impl Default for SensorHwConfig {
    fn default() -> Self {
        Self {
            i2c_address: DEFAULT_SENSOR_ADDRESS,
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Endpoint the measurements are reported on
    pub endpoint: EndpointId,
    /// Active sample source
    pub source: SourceMode,
    /// Simulated source settings (ignored in hardware mode)
    pub simulation: SimulationConfig,
    /// Scheduler timing
    pub scheduler: SchedulerConfig,
    /// Hardware sensor settings (ignored in simulated mode)
    pub sensor: SensorHwConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointId(1),
            source: SourceMode::Simulated,
            simulation: SimulationConfig::default(),
            scheduler: SchedulerConfig::default(),
            sensor: SensorHwConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Check every field for values the acquisition loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Endpoint 0 is the root node and never carries sensor clusters
        if self.endpoint.0 == 0 {
            return Err(ConfigError::InvalidEndpoint);
        }

        if self.scheduler.period_ms == 0 {
            return Err(ConfigError::InvalidPeriod);
        }

        if self.sensor.i2c_address > 0x7F {
            return Err(ConfigError::InvalidAddress);
        }

        self.simulation.validate()
    }
}

impl SimulationConfig {
    /// Check the starting point and step sizes against the bands
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TEMPERATURE_BAND.contains(self.initial_temperature_c)
            || !HUMIDITY_BAND.contains(self.initial_humidity_rh)
        {
            return Err(ConfigError::InitialValueOutOfBand);
        }

        let max_step = match self.policy {
            BoundaryPolicy::Saturate => MAX_WALK_STEP,
            BoundaryPolicy::Wrap => TEMPERATURE_BAND.hi - TEMPERATURE_BAND.lo,
        };
        if !valid_step(self.temperature_step, max_step) {
            return Err(ConfigError::InvalidStep);
        }

        let max_step = match self.policy {
            BoundaryPolicy::Saturate => MAX_WALK_STEP,
            BoundaryPolicy::Wrap => HUMIDITY_BAND.hi - HUMIDITY_BAND.lo,
        };
        if !valid_step(self.humidity_step, max_step) {
            return Err(ConfigError::InvalidStep);
        }

        Ok(())
    }
}

fn valid_step(step: f64, max: f64) -> bool {
    step.is_finite() && step > 0.0 && step <= max
}

/// Configuration text parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed `[section]` header
    InvalidSection,
    /// Key not recognized in its section
    UnknownKey,
    /// Line is not `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range for its key
    InvalidValue,
}

/// Configuration text parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line the error was found on
    pub line: u32,
    /// What went wrong
    pub kind: ParseErrorKind,
}

/// Configuration errors
///
/// These are fatal at startup: a node with an invalid configuration never
/// starts its acquisition task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Neither the simulated nor the hardware source is enabled
    NoSourceSelected,
    /// Both the simulated and the hardware source are enabled
    MultipleSourcesSelected,
    /// Simulator starting value lies outside its band
    InitialValueOutOfBand,
    /// Simulator step is not positive, not finite, or too large
    InvalidStep,
    /// Tick period is zero
    InvalidPeriod,
    /// Endpoint 0 is reserved for the root node
    InvalidEndpoint,
    /// Sensor address is not a 7-bit I2C address
    InvalidAddress,
    /// Configuration text could not be parsed
    Parse(ParseError),
}

impl From<ParseError> for ConfigError {
    fn from(err: ParseError) -> Self {
        ConfigError::Parse(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoSourceSelected => {
                f.write_str("no sensor source selected (enable `simulated` or `hardware`)")
            }
            ConfigError::MultipleSourcesSelected => {
                f.write_str("both sensor sources selected (enable only one)")
            }
            ConfigError::InitialValueOutOfBand => {
                f.write_str("simulation starting value outside its band")
            }
            ConfigError::InvalidStep => f.write_str("simulation step out of range"),
            ConfigError::InvalidPeriod => f.write_str("scheduler period must be non-zero"),
            ConfigError::InvalidEndpoint => f.write_str("endpoint 0 is reserved"),
            ConfigError::InvalidAddress => f.write_str("sensor address must be 7-bit"),
            ConfigError::Parse(err) => {
                let what = match err.kind {
                    ParseErrorKind::InvalidSection => "invalid section header",
                    ParseErrorKind::UnknownKey => "unknown key",
                    ParseErrorKind::InvalidLine => "expected `key = value`",
                    ParseErrorKind::InvalidValue => "invalid value",
                };
                write!(f, "line {}: {}", err.line, what)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_selection() {
        let sel = SourceSelection {
            simulated: true,
            hardware: false,
        };
        assert_eq!(sel.resolve(), Ok(SourceMode::Simulated));

        let sel = SourceSelection {
            simulated: false,
            hardware: true,
        };
        assert_eq!(sel.resolve(), Ok(SourceMode::Hardware));
    }

    #[test]
    fn test_source_selection_conflicts() {
        let both = SourceSelection {
            simulated: true,
            hardware: true,
        };
        assert_eq!(both.resolve(), Err(ConfigError::MultipleSourcesSelected));
        assert_eq!(
            SourceSelection::default().resolve(),
            Err(ConfigError::NoSourceSelected)
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.scheduler.startup_grace_ms, 5_000);
        assert_eq!(config.scheduler.period_ms, 10_000);
    }

    #[test]
    fn test_rejects_zero_period() {
        let mut config = NodeConfig::default();
        config.scheduler.period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPeriod));
    }

    #[test]
    fn test_rejects_root_endpoint() {
        let mut config = NodeConfig::default();
        config.endpoint = EndpointId(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidEndpoint));
    }

    #[test]
    fn test_walk_step_limit() {
        let mut sim = SimulationConfig::default();
        sim.temperature_step = 0.6;
        assert_eq!(sim.validate(), Err(ConfigError::InvalidStep));

        // The same step is fine for a ramp
        sim.policy = BoundaryPolicy::Wrap;
        assert_eq!(sim.validate(), Ok(()));

        sim.humidity_step = -0.1;
        assert_eq!(sim.validate(), Err(ConfigError::InvalidStep));
    }

    #[test]
    fn test_initial_value_out_of_band() {
        let mut sim = SimulationConfig::default();
        sim.initial_humidity_rh = 65.0;
        assert_eq!(sim.validate(), Err(ConfigError::InitialValueOutOfBand));
    }
}
