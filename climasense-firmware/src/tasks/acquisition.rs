//! Acquisition task
//!
//! Runs the acquisition scheduler until [`STOP_ACQUISITION`] fires.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use climasense_core::config::NodeConfig;
use climasense_core::publish::HealthStatus;
use climasense_core::scheduler::{AcquisitionScheduler, TickObserver};
use climasense_core::source::ActiveSource;
use climasense_drivers::sensor::Sht3x;

use crate::attributes::SharedAttributes;
use crate::channels::{HEALTH_CHANGED, STOP_ACQUISITION};

/// SHT3x on I2C0
pub type NodeSensor = Sht3x<I2c<'static, I2C0, Blocking>, Delay>;

/// Sample source selected by node.toml
pub type NodeSource = ActiveSource<NodeSensor>;

/// Forwards health transitions to the main task
struct HealthForwarder;

impl TickObserver for HealthForwarder {
    fn on_health_change(&mut self, status: HealthStatus) {
        HEALTH_CHANGED.signal(status);
    }
}

#[embassy_executor::task]
pub async fn acquisition_task(source: NodeSource, config: NodeConfig) {
    info!(
        "Acquisition task started: {:?} source on {}",
        source.mode(),
        config.endpoint
    );

    let mut scheduler = AcquisitionScheduler::new(
        config.scheduler,
        config.endpoint,
        source,
        SharedAttributes,
        HealthForwarder,
    );

    let summary = scheduler.run(&mut Delay, &STOP_ACQUISITION).await;

    info!(
        "Acquisition task finished: {} ticks, {} failed",
        summary.ticks, summary.failed_ticks
    );
}
