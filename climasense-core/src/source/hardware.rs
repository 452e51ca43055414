//! Hardware sample source
//!
//! Wraps a [`SensorDevice`] and turns its fetch-then-read interface into
//! [`SensorSample`]s. A missing or failing device never stops the
//! acquisition loop: the provider substitutes [`SensorSample::FALLBACK`].

use core::fmt;

use climasense_hal::{DeviceError, SensorChannel, SensorDevice, SensorValue};

use crate::sample::SensorSample;

/// Errors from a single acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionError {
    /// No device handle, or the device reports not ready
    DeviceUnavailable,
    /// Triggering the measurement failed
    FetchFailed(DeviceError),
    /// Reading a latched channel value failed
    ChannelFailed(SensorChannel, DeviceError),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::DeviceUnavailable => f.write_str("sensor device unavailable"),
            AcquisitionError::FetchFailed(err) => write!(f, "sample fetch failed: {}", err),
            AcquisitionError::ChannelFailed(channel, err) => {
                write!(f, "reading {:?} failed: {}", channel, err)
            }
        }
    }
}

/// Uninhabited device type for nodes built without a sensor
///
/// `HardwareSource<NoDevice>` can only ever be constructed with `None`,
/// so every acquisition reports [`AcquisitionError::DeviceUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDevice {}

impl SensorDevice for NoDevice {
    fn is_ready(&mut self) -> bool {
        match *self {}
    }

    fn fetch(&mut self) -> Result<(), DeviceError> {
        match *self {}
    }

    fn channel(&mut self, _channel: SensorChannel) -> Result<SensorValue, DeviceError> {
        match *self {}
    }
}

/// Sample source backed by a physical sensor
#[derive(Debug)]
pub struct HardwareSource<D> {
    /// Device handle (`None` when bring-up could not resolve it)
    device: Option<D>,
    /// Warm-up read completed
    initialized: bool,
    /// Error from the most recent acquisition, if it failed
    last_error: Option<AcquisitionError>,
    /// Number of acquisitions that fell back to the default sample
    fallbacks: u32,
}

impl<D: SensorDevice> HardwareSource<D> {
    /// Wrap a device handle
    pub fn new(device: Option<D>) -> Self {
        Self {
            device,
            initialized: false,
            last_error: None,
            fallbacks: 0,
        }
    }

    /// Verify readiness and perform one warm-up read
    ///
    /// The warm-up sample is discarded. Failure is not fatal: the source
    /// keeps working in degraded mode and is not retried automatically,
    /// though [`next`](Self::next) still checks readiness on every call.
    pub fn init(&mut self) -> Result<(), AcquisitionError> {
        match self.next() {
            Ok(sample) => {
                info!("Sensor ready, warm-up read: {}", sample);
                self.initialized = true;
                Ok(())
            }
            Err(err) => {
                warn!("Sensor init failed: {:?}; using fallback readings", err);
                self.initialized = false;
                Err(err)
            }
        }
    }

    /// Acquire one sample from the device
    pub fn next(&mut self) -> Result<SensorSample, AcquisitionError> {
        let result = match self.device.as_mut() {
            Some(device) => read_sample(device),
            None => Err(AcquisitionError::DeviceUnavailable),
        };
        self.last_error = result.err();
        result
    }

    /// Acquire one sample, substituting the fallback reading on failure
    pub fn next_or_fallback(&mut self) -> SensorSample {
        match self.next() {
            Ok(sample) => sample,
            Err(err) => {
                self.fallbacks = self.fallbacks.saturating_add(1);
                warn!("Sensor read failed: {:?}; using fallback reading", err);
                SensorSample::FALLBACK
            }
        }
    }

    /// Whether the warm-up read in [`init`](Self::init) succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Error from the most recent acquisition
    pub fn last_error(&self) -> Option<AcquisitionError> {
        self.last_error
    }

    /// Number of fallback readings substituted so far
    pub fn fallback_count(&self) -> u32 {
        self.fallbacks
    }

    /// Mutable access to the wrapped device
    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }
}

/// Fetch then read both channels
fn read_sample<D: SensorDevice>(device: &mut D) -> Result<SensorSample, AcquisitionError> {
    if !device.is_ready() {
        return Err(AcquisitionError::DeviceUnavailable);
    }

    device.fetch().map_err(AcquisitionError::FetchFailed)?;

    let temperature = read_channel(device, SensorChannel::AmbientTemperature)?;
    let humidity = read_channel(device, SensorChannel::RelativeHumidity)?;

    Ok(SensorSample::new(temperature, humidity))
}

fn read_channel<D: SensorDevice>(
    device: &mut D,
    channel: SensorChannel,
) -> Result<f64, AcquisitionError> {
    device
        .channel(channel)
        .map(SensorValue::to_f64)
        .map_err(|err| AcquisitionError::ChannelFailed(channel, err))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Scriptable sensor device
    #[derive(Debug, Clone)]
    pub(crate) struct FakeDevice {
        pub ready: bool,
        pub fetch_result: Result<(), DeviceError>,
        pub temperature: Result<SensorValue, DeviceError>,
        pub humidity: Result<SensorValue, DeviceError>,
        pub fetches: u32,
    }

    impl FakeDevice {
        pub(crate) fn reading(temperature: SensorValue, humidity: SensorValue) -> Self {
            Self {
                ready: true,
                fetch_result: Ok(()),
                temperature: Ok(temperature),
                humidity: Ok(humidity),
                fetches: 0,
            }
        }
    }

    impl SensorDevice for FakeDevice {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn fetch(&mut self) -> Result<(), DeviceError> {
            self.fetches += 1;
            self.fetch_result
        }

        fn channel(&mut self, channel: SensorChannel) -> Result<SensorValue, DeviceError> {
            match channel {
                SensorChannel::AmbientTemperature => self.temperature,
                SensorChannel::RelativeHumidity => self.humidity,
            }
        }
    }

    fn typical() -> FakeDevice {
        FakeDevice::reading(SensorValue::new(25, 340_000), SensorValue::new(48, 750_000))
    }

    #[test]
    fn test_combines_major_and_micro() {
        let mut source = HardwareSource::new(Some(typical()));
        let sample = source.next().unwrap();
        assert!((sample.temperature_c - 25.34).abs() < 1e-9);
        assert!((sample.humidity_rh - 48.75).abs() < 1e-9);
        assert_eq!(source.last_error(), None);
    }

    #[test]
    fn test_not_ready_falls_back() {
        let mut device = typical();
        device.ready = false;
        let mut source = HardwareSource::new(Some(device));

        assert_eq!(source.next(), Err(AcquisitionError::DeviceUnavailable));

        let sample = source.next_or_fallback();
        assert_eq!(sample, SensorSample::new(20.0, 40.0));
        assert_eq!(source.last_error(), Some(AcquisitionError::DeviceUnavailable));
        assert_eq!(source.fallback_count(), 1);
    }

    #[test]
    fn test_missing_device_falls_back() {
        let mut source = HardwareSource::<NoDevice>::new(None);
        assert_eq!(source.next(), Err(AcquisitionError::DeviceUnavailable));
        assert_eq!(source.next_or_fallback(), SensorSample::FALLBACK);
    }

    #[test]
    fn test_fetch_failure() {
        let mut device = typical();
        device.fetch_result = Err(DeviceError::Timeout);
        let mut source = HardwareSource::new(Some(device));

        assert_eq!(
            source.next(),
            Err(AcquisitionError::FetchFailed(DeviceError::Timeout))
        );
        assert_eq!(source.next_or_fallback(), SensorSample::FALLBACK);
    }

    #[test]
    fn test_channel_failure() {
        let mut device = typical();
        device.humidity = Err(DeviceError::Crc);
        let mut source = HardwareSource::new(Some(device));

        assert_eq!(
            source.next(),
            Err(AcquisitionError::ChannelFailed(
                SensorChannel::RelativeHumidity,
                DeviceError::Crc
            ))
        );
    }

    #[test]
    fn test_fallback_only_for_failed_tick() {
        let mut source = HardwareSource::new(Some(typical()));
        source.device_mut().unwrap().fetch_result = Err(DeviceError::Bus);
        assert_eq!(source.next_or_fallback(), SensorSample::FALLBACK);

        source.device_mut().unwrap().fetch_result = Ok(());
        let sample = source.next_or_fallback();
        assert!((sample.temperature_c - 25.34).abs() < 1e-9);
        assert_eq!(source.last_error(), None);
        assert_eq!(source.fallback_count(), 1);
    }

    #[test]
    fn test_init_warm_up() {
        let mut source = HardwareSource::new(Some(typical()));
        assert!(source.init().is_ok());
        assert!(source.is_initialized());
        assert_eq!(source.device_mut().unwrap().fetches, 1);
    }

    #[test]
    fn test_init_failure_is_not_fatal() {
        let mut device = typical();
        device.ready = false;
        let mut source = HardwareSource::new(Some(device));

        assert_eq!(source.init(), Err(AcquisitionError::DeviceUnavailable));
        assert!(!source.is_initialized());

        // Device comes up later; readiness is checked on every read
        source.device_mut().unwrap().ready = true;
        assert!(source.next().is_ok());
    }
}
