//! Embassy async tasks

pub mod acquisition;

pub use acquisition::{acquisition_task, NodeSensor, NodeSource};
