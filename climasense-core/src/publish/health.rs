//! Publish health monitoring
//!
//! Tracks consecutive ticks in which at least one attribute write was
//! rejected. Crossing the configured threshold flips the status to
//! `Degraded`; one fully successful tick flips it back. The monitor only
//! reports; publishing continues regardless of the status.

/// Publish health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthStatus {
    /// Recent publishes went through
    Healthy,
    /// Publishing has failed for at least the threshold number of ticks
    Degraded {
        /// Consecutive failed ticks when the status changed
        consecutive_failures: u16,
    },
}

/// Consecutive-failure monitor
#[derive(Debug, Clone)]
pub struct PublishHealth {
    /// Failed ticks needed to report degraded (`None` = never)
    threshold: Option<u16>,
    /// Current run of failed ticks
    consecutive_failures: u16,
    /// Last reported status
    status: HealthStatus,
}

impl PublishHealth {
    /// Create a monitor; `threshold` of `None` disables degraded reporting
    pub fn new(threshold: Option<u16>) -> Self {
        Self {
            threshold: threshold.filter(|&n| n > 0),
            consecutive_failures: 0,
            status: HealthStatus::Healthy,
        }
    }

    /// Record one tick's publish result
    ///
    /// Returns the new status if this tick changed it.
    pub fn record(&mut self, success: bool) -> Option<HealthStatus> {
        if success {
            self.consecutive_failures = 0;
            if self.status != HealthStatus::Healthy {
                self.status = HealthStatus::Healthy;
                return Some(self.status);
            }
            return None;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        match (self.threshold, self.status) {
            (Some(threshold), HealthStatus::Healthy) if self.consecutive_failures >= threshold => {
                self.status = HealthStatus::Degraded {
                    consecutive_failures: self.consecutive_failures,
                };
                Some(self.status)
            }
            _ => None,
        }
    }

    /// Current status
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Length of the current run of failed ticks
    pub fn consecutive_failures(&self) -> u16 {
        self.consecutive_failures
    }
}
