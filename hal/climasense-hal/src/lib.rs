//! Climasense Hardware Abstraction Layer
//!
//! This crate defines the contract between the acquisition logic and the
//! physical sensor peripherals. Sensor drivers implement these traits so
//! the same application code runs against any temperature/humidity device.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  climasense-core (acquisition loop)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  climasense-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  climasense-drivers (SHT3x, ...)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`sensor::SensorDevice`] - Fetch-then-read sensor peripherals

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;

pub use sensor::{DeviceError, SensorChannel, SensorDevice, SensorValue, MICROS_PER_UNIT};
