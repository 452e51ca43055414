//! Inter-task signals
//!
//! Static embassy-sync signals connecting the acquisition task to the
//! main task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use climasense_core::publish::{AttributeKind, HealthStatus};

/// An attribute in the table was updated
pub static ATTRIBUTE_CHANGED: Signal<CriticalSectionRawMutex, AttributeKind> = Signal::new();

/// Publish health changed
pub static HEALTH_CHANGED: Signal<CriticalSectionRawMutex, HealthStatus> = Signal::new();

/// Stop the acquisition loop
///
/// Nothing on the board signals this yet, so it stays pending and the
/// loop runs for the life of the firmware. A shutdown or reconfigure
/// command from the protocol stack is the intended trigger.
pub static STOP_ACQUISITION: Signal<CriticalSectionRawMutex, ()> = Signal::new();
