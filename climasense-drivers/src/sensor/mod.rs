//! Sensor drivers

pub mod sht3x;

pub use sht3x::{Sht3x, DEFAULT_ADDRESS};
