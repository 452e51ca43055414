//! Hardware driver implementations
//!
//! Concrete implementations of the device traits defined in
//! `climasense-hal`:
//!
//! - Temperature/humidity sensors (Sensirion SHT3x over I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod sensor;
