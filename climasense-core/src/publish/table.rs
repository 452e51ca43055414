//! In-memory attribute table
//!
//! A minimal [`AttributeStore`] for one endpoint exposing the two
//! measurement clusters. Writes are checked against the cluster's
//! MeasuredValue range before they are accepted.

use super::store::{AttributeKind, AttributeStore, AttributeValue, EndpointId, Status};

/// Lowest representable temperature (absolute zero, 0.01°C)
pub const TEMPERATURE_MIN_CENTI: i16 = -27315;

/// Highest relative humidity (100.00%)
pub const HUMIDITY_MAX_CENTI: u16 = 10_000;

/// Measured values of one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttributeTable {
    endpoint: Option<EndpointId>,
    temperature: Option<i16>,
    humidity: Option<u16>,
    /// Accepted writes so far
    version: u32,
}

impl Default for AttributeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeTable {
    /// Create a table with no endpoint registered
    pub const fn new() -> Self {
        Self {
            endpoint: None,
            temperature: None,
            humidity: None,
            version: 0,
        }
    }

    /// Register the endpoint the table answers for
    ///
    /// Re-registering clears the stored values.
    pub fn register(&mut self, endpoint: EndpointId) {
        *self = Self {
            endpoint: Some(endpoint),
            ..Self::new()
        };
    }

    /// Registered endpoint
    pub fn endpoint(&self) -> Option<EndpointId> {
        self.endpoint
    }

    /// Last accepted temperature (0.01°C)
    pub fn temperature(&self) -> Option<i16> {
        self.temperature
    }

    /// Last accepted humidity (0.01%RH)
    pub fn humidity(&self) -> Option<u16> {
        self.humidity
    }

    /// Current value of `kind`
    pub fn get(&self, kind: AttributeKind) -> Option<AttributeValue> {
        match kind {
            AttributeKind::Temperature => self.temperature.map(AttributeValue::Temperature),
            AttributeKind::Humidity => self.humidity.map(AttributeValue::Humidity),
        }
    }

    /// Number of accepted writes
    pub fn version(&self) -> u32 {
        self.version
    }
}

impl AttributeStore for AttributeTable {
    fn set_attribute(&mut self, endpoint: EndpointId, value: AttributeValue) -> Status {
        if self.endpoint != Some(endpoint) {
            return Status::UnsupportedEndpoint;
        }

        match value {
            AttributeValue::Temperature(centi) if centi < TEMPERATURE_MIN_CENTI => {
                return Status::ConstraintError
            }
            AttributeValue::Humidity(centi) if centi > HUMIDITY_MAX_CENTI => {
                return Status::ConstraintError
            }
            AttributeValue::Temperature(centi) => self.temperature = Some(centi),
            AttributeValue::Humidity(centi) => self.humidity = Some(centi),
        }

        self.version = self.version.wrapping_add(1);
        Status::Success
    }
}
