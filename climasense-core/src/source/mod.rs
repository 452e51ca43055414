//! Sample sources
//!
//! - [`SimulatedSource`]: deterministic synthetic readings
//! - [`HardwareSource`]: a physical sensor with fallback readings
//! - [`ActiveSource`]: whichever of the two the configuration selects

pub mod hardware;
pub mod provider;
pub mod simulated;

pub use hardware::{AcquisitionError, HardwareSource, NoDevice};
pub use provider::{ActiveSource, SensorProvider};
pub use simulated::{SimulatedSource, SimulationState};
