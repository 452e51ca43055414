//! Climasense - Environmental Sensor Node Firmware
//!
//! Main firmware binary for RP2040-based sensor nodes. A background task
//! samples a simulated or physical SHT3x sensor, converts each reading to
//! centi-units and publishes it to the attribute table on a fixed cadence.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::i2c::{self, I2c};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use climasense_core::config::{parse_config, NodeConfig, SourceMode};
use climasense_core::source::ActiveSource;
use climasense_core::WireReading;
use climasense_drivers::sensor::Sht3x;

use crate::channels::{ATTRIBUTE_CHANGED, HEALTH_CHANGED};
use crate::tasks::NodeSource;

mod attributes;
mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit node.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../node.toml");

/// I2C bus frequency for the sensor
const I2C_FREQUENCY_HZ: u32 = 100_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Climasense firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // build.rs validates node.toml, so this only fails if the check was bypassed
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid embedded configuration: {:?}", e);
            error!("Acquisition disabled");
            idle().await
        }
    };
    info!(
        "Configuration loaded: endpoint {}, grace {} ms, period {} ms",
        config.endpoint.0, config.scheduler.startup_grace_ms, config.scheduler.period_ms
    );

    // Pin assignment is board-specific (Pico: SDA=GPIO4, SCL=GPIO5)
    let device = match config.source {
        SourceMode::Hardware => {
            let mut i2c_config = i2c::Config::default();
            i2c_config.frequency = I2C_FREQUENCY_HZ;
            let bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
            info!("I2C0 initialized, sensor at {:#x}", config.sensor.i2c_address);
            Some(Sht3x::new(bus, Delay, config.sensor.i2c_address))
        }
        SourceMode::Simulated => None,
    };

    let source = match build_source(&config, device) {
        Some(source) => source,
        None => idle().await,
    };

    attributes::register_endpoint(config.endpoint);

    unwrap!(spawner.spawn(tasks::acquisition_task(source, config)));

    info!("All tasks spawned, firmware running");

    // Stand-in for the protocol stack's dispatch loop
    let mut seen_version = 0;
    loop {
        match select(ATTRIBUTE_CHANGED.wait(), HEALTH_CHANGED.wait()).await {
            Either::First(kind) => {
                trace!("{:?} changed", kind);
                log_attributes(&mut seen_version);
            }
            Either::Second(status) => warn!("Publish health changed: {:?}", status),
        }
    }
}

/// Build the configured sample source, or `None` if the config is invalid
fn build_source(config: &NodeConfig, device: Option<tasks::NodeSensor>) -> Option<NodeSource> {
    match ActiveSource::from_config(config, device) {
        Ok(source) => Some(source),
        Err(e) => {
            error!("Configuration rejected: {:?}; acquisition not started", e);
            None
        }
    }
}

/// Log the attribute table if it accepted writes since `seen_version`
///
/// The signal only keeps the latest kind, so the table's write counter
/// decides whether anything is new.
fn log_attributes(seen_version: &mut u32) {
    let table = attributes::snapshot();
    if table.version() == *seen_version {
        return;
    }
    *seen_version = table.version();

    match (table.temperature(), table.humidity()) {
        (Some(t), Some(h)) => info!(
            "Attributes (write #{}): {}",
            table.version(),
            Display2Format(&WireReading::new(t, h))
        ),
        (t, h) => info!(
            "Attributes (write #{}): temperature {:?}, humidity {:?}",
            table.version(),
            t,
            h
        ),
    }
}

/// Park the main task forever
async fn idle() -> ! {
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
