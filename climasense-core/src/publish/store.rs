//! Attribute store interface
//!
//! The attribute store belongs to the protocol stack hosting the node. The
//! core only needs one operation from it: set the measured value of an
//! attribute on an endpoint and learn whether that worked.

use core::fmt;

/// Logical endpoint a measurement is reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointId(pub u16);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep{}", self.0)
    }
}

/// Attributes written by the publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttributeKind {
    /// Temperature Measurement cluster, MeasuredValue
    Temperature,
    /// Relative Humidity Measurement cluster, MeasuredValue
    Humidity,
}

impl AttributeKind {
    /// Cluster the attribute lives in
    pub const fn cluster_id(self) -> u32 {
        match self {
            AttributeKind::Temperature => 0x0402,
            AttributeKind::Humidity => 0x0405,
        }
    }

    /// Attribute id within the cluster (MeasuredValue in both cases)
    pub const fn attribute_id(self) -> u32 {
        0x0000
    }
}

/// A typed attribute value in centi-units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttributeValue {
    /// Temperature in 0.01°C
    Temperature(i16),
    /// Relative humidity in 0.01%
    Humidity(u16),
}

impl AttributeValue {
    /// The attribute this value is written to
    pub const fn kind(self) -> AttributeKind {
        match self {
            AttributeValue::Temperature(_) => AttributeKind::Temperature,
            AttributeValue::Humidity(_) => AttributeKind::Humidity,
        }
    }
}

/// Interaction status returned by the attribute store
///
/// Only equality with [`Status::Success`] is inspected by the publisher;
/// the other codes are carried through for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    Success = 0x00,
    Failure = 0x01,
    UnsupportedAccess = 0x7E,
    UnsupportedEndpoint = 0x7F,
    InvalidAction = 0x80,
    UnsupportedAttribute = 0x86,
    ConstraintError = 0x87,
    UnsupportedWrite = 0x88,
    ResourceExhausted = 0x89,
    InvalidDataType = 0x8D,
    Busy = 0x9C,
    UnsupportedCluster = 0xC3,
}

impl Status {
    /// Numeric status code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Check for the success sentinel
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

/// Writable attribute store
///
/// Implemented by the protocol stack (or a test double). Each call is an
/// independent write; the publisher never reads back or retries.
pub trait AttributeStore {
    /// Set an attribute's measured value on an endpoint
    fn set_attribute(&mut self, endpoint: EndpointId, value: AttributeValue) -> Status;
}

impl<T: AttributeStore + ?Sized> AttributeStore for &mut T {
    fn set_attribute(&mut self, endpoint: EndpointId, value: AttributeValue) -> Status {
        T::set_attribute(self, endpoint, value)
    }
}
