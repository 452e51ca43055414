//! Acquisition loop
//!
//! One tick is: produce a sample, convert it to the wire representation,
//! publish both attributes, update publish health. [`AcquisitionScheduler::run`]
//! waits out the startup grace period, then ticks once per period until the
//! cancellation signal fires. Failed publishes never end the loop.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use super::state::{SchedulerEvent, SchedulerState};
use crate::config::SchedulerConfig;
use crate::convert::to_wire;
use crate::publish::{
    AttributePublisher, AttributeStore, EndpointId, HealthStatus, PublishHealth, PublishOutcome,
};
use crate::sample::{SensorSample, WireReading};
use crate::source::SensorProvider;

/// Everything that happened in one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u32,
    /// Sample produced by the provider
    pub sample: SensorSample,
    /// Converted reading that was published
    pub reading: WireReading,
    /// Per-attribute publish result
    pub outcome: PublishOutcome,
    /// Publish health after this tick
    pub health: HealthStatus,
}

/// Hook for reacting to ticks and health changes
///
/// Both methods default to doing nothing.
pub trait TickObserver {
    /// Called after every tick
    fn on_tick(&mut self, _report: &TickReport) {}

    /// Called when the publish health status changes
    fn on_health_change(&mut self, _status: HealthStatus) {}
}

impl TickObserver for () {}

impl<T: TickObserver + ?Sized> TickObserver for &mut T {
    fn on_tick(&mut self, report: &TickReport) {
        T::on_tick(self, report)
    }

    fn on_health_change(&mut self, status: HealthStatus) {
        T::on_health_change(self, status)
    }
}

/// Totals returned when the run loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    /// Ticks executed
    pub ticks: u32,
    /// Ticks with at least one rejected write
    pub failed_ticks: u32,
}

/// Periodic acquire, convert and publish loop
pub struct AcquisitionScheduler<P, S, O = ()> {
    config: SchedulerConfig,
    publisher: AttributePublisher,
    provider: P,
    store: S,
    observer: O,
    health: PublishHealth,
    state: SchedulerState,
    summary: RunSummary,
}

impl<P, S, O> AcquisitionScheduler<P, S, O>
where
    P: SensorProvider,
    S: AttributeStore,
    O: TickObserver,
{
    /// Create an idle scheduler publishing to `endpoint`
    pub fn new(
        config: SchedulerConfig,
        endpoint: EndpointId,
        provider: P,
        store: S,
        observer: O,
    ) -> Self {
        Self {
            config,
            publisher: AttributePublisher::new(endpoint),
            provider,
            store,
            observer,
            health: PublishHealth::new(config.degraded_after),
            state: SchedulerState::Idle,
            summary: RunSummary::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Current publish health
    pub fn health(&self) -> HealthStatus {
        self.health.status()
    }

    /// Totals so far
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Sample provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Attribute store the readings are written to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tick observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Run one acquisition cycle
    ///
    /// Never fails: provider errors are absorbed by the provider and
    /// rejected writes are reported in the returned outcome.
    pub fn tick(&mut self) -> TickReport {
        let sample = self.provider.produce();
        let reading = to_wire(sample);
        let outcome = self.publisher.publish(&mut self.store, reading);

        let success = outcome.is_success();
        self.summary.ticks = self.summary.ticks.saturating_add(1);
        if !success {
            self.summary.failed_ticks = self.summary.failed_ticks.saturating_add(1);
        }
        self.state = self.state.transition(SchedulerEvent::Tick);

        debug!("Tick {}: {} -> {}", self.summary.ticks, sample, reading);

        if let Some(status) = self.health.record(success) {
            match status {
                HealthStatus::Degraded {
                    consecutive_failures,
                } => warn!(
                    "Publishing degraded after {} failed ticks",
                    consecutive_failures
                ),
                HealthStatus::Healthy => info!("Publishing recovered"),
            }
            self.observer.on_health_change(status);
        }

        let report = TickReport {
            tick: self.summary.ticks,
            sample,
            reading,
            outcome,
            health: self.health.status(),
        };
        self.observer.on_tick(&report);
        report
    }

    /// Run until `cancel` is signalled
    ///
    /// Sleeps are raced against the signal, so cancellation takes effect
    /// at the next wait without finishing it. A scheduler that has already
    /// run returns its summary immediately.
    pub async fn run<D, M>(&mut self, delay: &mut D, cancel: &Signal<M, ()>) -> RunSummary
    where
        D: DelayNs,
        M: RawMutex,
    {
        if self.state != SchedulerState::Idle {
            warn!("Scheduler already started ({:?})", self.state);
            return self.summary;
        }

        self.state = self.state.transition(SchedulerEvent::Start);
        info!(
            "Acquisition starting: grace {} ms, period {} ms",
            self.config.startup_grace_ms, self.config.period_ms
        );

        if let Either::First(()) =
            select(cancel.wait(), delay.delay_ms(self.config.startup_grace_ms)).await
        {
            return self.stop();
        }

        self.state = self.state.transition(SchedulerEvent::GraceElapsed);
        info!("Grace period elapsed, sampling every {} ms", self.config.period_ms);

        loop {
            self.tick();

            if let Either::First(()) =
                select(cancel.wait(), delay.delay_ms(self.config.period_ms)).await
            {
                return self.stop();
            }
        }
    }

    fn stop(&mut self) -> RunSummary {
        self.state = self.state.transition(SchedulerEvent::Cancel);
        info!(
            "Acquisition stopped after {} ticks ({} failed)",
            self.summary.ticks, self.summary.failed_ticks
        );
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use crate::config::{BoundaryPolicy, SimulationConfig};
    use crate::publish::{AttributeKind, AttributeValue, Status};
    use crate::source::SimulatedSource;

    /// Delay that advances a shared virtual clock instead of sleeping
    struct VirtualDelay<'a> {
        now_ms: &'a Cell<u64>,
        sleeps: Vec<u32>,
    }

    impl<'a> VirtualDelay<'a> {
        fn new(now_ms: &'a Cell<u64>) -> Self {
            Self {
                now_ms,
                sleeps: Vec::new(),
            }
        }
    }

    impl DelayNs for VirtualDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.now_ms.set(self.now_ms.get() + u64::from(ns / 1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.sleeps.push(ms);
            self.now_ms.set(self.now_ms.get() + u64::from(ms));
        }
    }

    /// Store recording each write with the virtual time it happened at
    struct RecordingStore<'a> {
        now_ms: &'a Cell<u64>,
        status: Status,
        writes: Vec<(u64, AttributeValue)>,
    }

    impl<'a> RecordingStore<'a> {
        fn new(now_ms: &'a Cell<u64>, status: Status) -> Self {
            Self {
                now_ms,
                status,
                writes: Vec::new(),
            }
        }

        fn write_times(&self, kind: AttributeKind) -> Vec<u64> {
            self.writes
                .iter()
                .filter(|(_, value)| value.kind() == kind)
                .map(|(at, _)| *at)
                .collect()
        }
    }

    impl AttributeStore for RecordingStore<'_> {
        fn set_attribute(&mut self, _endpoint: EndpointId, value: AttributeValue) -> Status {
            self.writes.push((self.now_ms.get(), value));
            self.status
        }
    }

    /// Observer that cancels after a fixed number of ticks
    struct StopAfter<'a> {
        cancel: &'a Signal<NoopRawMutex, ()>,
        remaining: u32,
        reports: Vec<TickReport>,
        health_changes: Vec<HealthStatus>,
    }

    impl<'a> StopAfter<'a> {
        fn new(cancel: &'a Signal<NoopRawMutex, ()>, ticks: u32) -> Self {
            Self {
                cancel,
                remaining: ticks,
                reports: Vec::new(),
                health_changes: Vec::new(),
            }
        }
    }

    impl TickObserver for StopAfter<'_> {
        fn on_tick(&mut self, report: &TickReport) {
            self.reports.push(*report);
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.cancel.signal(());
            }
        }

        fn on_health_change(&mut self, status: HealthStatus) {
            self.health_changes.push(status);
        }
    }

    /// Provider returning the same sample every tick
    struct Constant(SensorSample);

    impl SensorProvider for Constant {
        fn produce(&mut self) -> SensorSample {
            self.0
        }
    }

    fn scheduler_config() -> SchedulerConfig {
        SchedulerConfig {
            startup_grace_ms: 5000,
            period_ms: 10_000,
            degraded_after: Some(3),
        }
    }

    #[test]
    fn test_publishes_after_grace_then_every_period() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);

        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::new(25.34, 48.75)),
            RecordingStore::new(&clock, Status::Success),
            StopAfter::new(&cancel, 3),
        );

        let summary = block_on(scheduler.run(&mut delay, &cancel));

        assert_eq!(summary, RunSummary { ticks: 3, failed_ticks: 0 });
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(
            scheduler.store().write_times(AttributeKind::Temperature),
            [5000, 15_000, 25_000]
        );
        assert_eq!(
            scheduler.store().write_times(AttributeKind::Humidity),
            [5000, 15_000, 25_000]
        );
        // The sleep after the last tick is abandoned
        assert_eq!(delay.sleeps, [5000, 10_000, 10_000]);
    }

    #[test]
    fn test_publishes_converted_reading() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);

        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::new(25.34, 48.75)),
            RecordingStore::new(&clock, Status::Success),
            StopAfter::new(&cancel, 1),
        );
        block_on(scheduler.run(&mut delay, &cancel));

        let values: Vec<AttributeValue> =
            scheduler.store().writes.iter().map(|(_, v)| *v).collect();
        assert_eq!(
            values,
            [
                AttributeValue::Temperature(2534),
                AttributeValue::Humidity(4875)
            ]
        );
        let report = scheduler.observer().reports[0];
        assert_eq!(report.tick, 1);
        assert_eq!(report.reading, WireReading::new(2534, 4875));
    }

    #[test]
    fn test_cancel_during_grace_publishes_nothing() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);
        cancel.signal(());

        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::FALLBACK),
            RecordingStore::new(&clock, Status::Success),
            (),
        );
        let summary = block_on(scheduler.run(&mut delay, &cancel));

        assert_eq!(summary, RunSummary::default());
        assert!(scheduler.store().writes.is_empty());
        assert!(delay.sleeps.is_empty());
        assert!(scheduler.state().is_stopped());
    }

    #[test]
    fn test_run_twice_does_not_restart() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);

        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::FALLBACK),
            RecordingStore::new(&clock, Status::Success),
            StopAfter::new(&cancel, 2),
        );
        block_on(scheduler.run(&mut delay, &cancel));
        let summary = block_on(scheduler.run(&mut delay, &cancel));

        assert_eq!(summary.ticks, 2);
        assert_eq!(scheduler.store().writes.len(), 4);
    }

    #[test]
    fn test_failed_publish_keeps_running() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);

        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::FALLBACK),
            RecordingStore::new(&clock, Status::Failure),
            StopAfter::new(&cancel, 5),
        );
        let summary = block_on(scheduler.run(&mut delay, &cancel));

        assert_eq!(summary, RunSummary { ticks: 5, failed_ticks: 5 });
        // Every tick still attempted both writes
        assert_eq!(scheduler.store().writes.len(), 10);
        assert_eq!(
            scheduler.observer().health_changes,
            [HealthStatus::Degraded {
                consecutive_failures: 3
            }]
        );
        assert_eq!(
            scheduler.health(),
            HealthStatus::Degraded {
                consecutive_failures: 3
            }
        );
    }

    #[test]
    fn test_tick_reports_rejections() {
        let clock = Cell::new(0);
        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            Constant(SensorSample::FALLBACK),
            RecordingStore::new(&clock, Status::Busy),
            (),
        );

        let report = scheduler.tick();
        assert!(!report.outcome.is_success());
        assert_eq!(report.outcome.rejections().len(), 2);
        assert_eq!(report.reading, WireReading::new(2000, 4000));
        assert_eq!(report.health, HealthStatus::Healthy);
        assert_eq!(scheduler.summary().failed_ticks, 1);
    }

    #[test]
    fn test_health_recovers_through_observer() {
        struct Flaky {
            fail_first: u32,
            calls: u32,
        }

        impl AttributeStore for Flaky {
            fn set_attribute(&mut self, _endpoint: EndpointId, _value: AttributeValue) -> Status {
                self.calls += 1;
                // Two writes per tick
                if self.calls <= self.fail_first * 2 {
                    Status::Failure
                } else {
                    Status::Success
                }
            }
        }

        #[derive(Default)]
        struct Changes(Vec<HealthStatus>);

        impl TickObserver for Changes {
            fn on_health_change(&mut self, status: HealthStatus) {
                self.0.push(status);
            }
        }

        let mut changes = Changes::default();
        let mut scheduler = AcquisitionScheduler::new(
            SchedulerConfig {
                degraded_after: Some(2),
                ..scheduler_config()
            },
            EndpointId(1),
            Constant(SensorSample::FALLBACK),
            Flaky {
                fail_first: 2,
                calls: 0,
            },
            &mut changes,
        );
        for _ in 0..4 {
            scheduler.tick();
        }
        drop(scheduler);

        assert_eq!(
            changes.0,
            [
                HealthStatus::Degraded {
                    consecutive_failures: 2
                },
                HealthStatus::Healthy
            ]
        );
    }

    #[test]
    fn test_simulated_source_end_to_end() {
        let clock = Cell::new(0);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        let mut delay = VirtualDelay::new(&clock);

        let source = SimulatedSource::new(SimulationConfig {
            policy: BoundaryPolicy::Wrap,
            ..SimulationConfig::default()
        });
        let mut scheduler = AcquisitionScheduler::new(
            scheduler_config(),
            EndpointId(1),
            source,
            RecordingStore::new(&clock, Status::Success),
            StopAfter::new(&cancel, 25),
        );
        let summary = block_on(scheduler.run(&mut delay, &cancel));

        assert_eq!(summary.ticks, 25);
        assert_eq!(scheduler.provider().state().ticks, 25);
        for report in &scheduler.observer().reports {
            assert!(report.sample.within_bands());
            assert!((2000..=3000).contains(&report.reading.temperature_centi));
            assert!((4000..=6000).contains(&report.reading.humidity_centi));
        }
        // First ramp step from 25.0 / 50.0
        assert_eq!(
            scheduler.observer().reports[0].reading,
            WireReading::new(2510, 5050)
        );
    }
}
