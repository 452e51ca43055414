//! Periodic acquisition scheduling
//!
//! - [`state`]: lifecycle state machine
//! - [`runner`]: the cancellable tick loop

pub mod runner;
pub mod state;

pub use runner::{AcquisitionScheduler, RunSummary, TickObserver, TickReport};
pub use state::{SchedulerEvent, SchedulerState};
