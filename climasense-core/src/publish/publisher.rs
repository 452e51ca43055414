//! Attribute publisher
//!
//! Writes one converted reading to the attribute store. Temperature and
//! humidity are separate writes: a rejection of one never skips the other.

use heapless::Vec;

use super::store::{AttributeKind, AttributeStore, AttributeValue, EndpointId, Status};
use crate::sample::WireReading;

/// An attribute write the store refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishRejected {
    /// Attribute that was not updated
    pub attribute: AttributeKind,
    /// Status the store returned
    pub status: Status,
}

/// Per-attribute result of one publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishOutcome {
    /// Status of the temperature write
    pub temperature: Status,
    /// Status of the humidity write
    pub humidity: Status,
}

impl PublishOutcome {
    /// Both attributes were written
    pub fn is_success(&self) -> bool {
        self.temperature.is_success() && self.humidity.is_success()
    }

    /// The writes that failed, temperature first
    pub fn rejections(&self) -> Vec<PublishRejected, 2> {
        let mut out = Vec::new();
        for (attribute, status) in [
            (AttributeKind::Temperature, self.temperature),
            (AttributeKind::Humidity, self.humidity),
        ] {
            if !status.is_success() {
                // Capacity matches the number of attributes
                let _ = out.push(PublishRejected { attribute, status });
            }
        }
        out
    }
}

/// Publishes readings for one endpoint
#[derive(Debug, Clone, Copy)]
pub struct AttributePublisher {
    endpoint: EndpointId,
}

impl AttributePublisher {
    /// Create a publisher for `endpoint`
    pub const fn new(endpoint: EndpointId) -> Self {
        Self { endpoint }
    }

    /// Endpoint this publisher writes to
    pub fn endpoint(&self) -> EndpointId {
        self.endpoint
    }

    /// Write both attributes of `reading`
    ///
    /// Failures are logged and reported in the outcome; nothing is retried.
    pub fn publish<S>(&self, store: &mut S, reading: WireReading) -> PublishOutcome
    where
        S: AttributeStore + ?Sized,
    {
        let temperature = self.write(
            store,
            AttributeValue::Temperature(reading.temperature_centi),
        );
        let humidity = self.write(store, AttributeValue::Humidity(reading.humidity_centi));

        PublishOutcome {
            temperature,
            humidity,
        }
    }

    fn write<S>(&self, store: &mut S, value: AttributeValue) -> Status
    where
        S: AttributeStore + ?Sized,
    {
        let status = store.set_attribute(self.endpoint, value);
        if status.is_success() {
            trace!("{:?} updated: {:?}", value.kind(), value);
        } else {
            let kind = value.kind();
            error!(
                "Failed to update {:?} (cluster {:#06x}, attribute {:#06x}): {:?} (code {:#04x})",
                kind,
                kind.cluster_id(),
                kind.attribute_id(),
                status,
                status.code()
            );
        }
        status
    }
}
