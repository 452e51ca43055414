//! Board-agnostic core logic for the sensor node firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Sensor samples and the fixed-point wire representation
//! - Sample sources (simulated walk/ramp, hardware with fallback)
//! - Attribute publishing and publish-health monitoring
//! - The cancellable acquisition scheduler
//! - Configuration types and the `node.toml` parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod logging;

pub mod config;
pub mod convert;
pub mod publish;
pub mod sample;
pub mod scheduler;
pub mod source;

pub use convert::to_wire;
pub use sample::{SensorSample, WireReading};
