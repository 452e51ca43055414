//! Scheduler state machine
//!
//! ```text
//! Idle ──Start──▶ WarmingUp ──GraceElapsed──▶ Sampling ──Tick──▶ Sampling …
//!                     │                           │
//!                     └──────────Cancel───────────┴──────▶ Stopped
//! ```
//!
//! There is no terminal state other than `Stopped`, which is only reached
//! through cancellation.

/// Scheduler states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    /// Created, not yet started
    Idle,
    /// Waiting out the startup grace period
    WarmingUp,
    /// Running ticks at the configured period
    Sampling,
    /// Cancelled; no further ticks
    Stopped,
}

/// Scheduler events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerEvent {
    /// The run loop was entered
    Start,
    /// The startup grace period has passed
    GraceElapsed,
    /// One tick completed
    Tick,
    /// Cancellation was observed
    Cancel,
}

impl SchedulerState {
    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: SchedulerEvent) -> Self {
        use SchedulerEvent::*;
        use SchedulerState::*;

        match (self, event) {
            (Idle, Start) => WarmingUp,
            (WarmingUp, GraceElapsed) => Sampling,
            (Sampling, Tick) => Sampling,
            (Idle | WarmingUp | Sampling, Cancel) => Stopped,
            (state, _) => state,
        }
    }

    /// Check whether ticks may run in this state
    pub fn is_sampling(&self) -> bool {
        matches!(self, SchedulerState::Sampling)
    }

    /// Check whether the scheduler has been cancelled
    pub fn is_stopped(&self) -> bool {
        matches!(self, SchedulerState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_lifecycle() {
        let state = SchedulerState::Idle;
        let state = state.transition(SchedulerEvent::Start);
        assert_eq!(state, SchedulerState::WarmingUp);

        let state = state.transition(SchedulerEvent::GraceElapsed);
        assert!(state.is_sampling());

        let state = state.transition(SchedulerEvent::Tick);
        assert!(state.is_sampling());
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        for state in [
            SchedulerState::Idle,
            SchedulerState::WarmingUp,
            SchedulerState::Sampling,
        ] {
            assert!(state.transition(SchedulerEvent::Cancel).is_stopped());
        }
    }

    #[test]
    fn test_stopped_is_final() {
        let state = SchedulerState::Stopped;
        assert_eq!(state.transition(SchedulerEvent::Start), SchedulerState::Stopped);
        assert_eq!(state.transition(SchedulerEvent::Tick), SchedulerState::Stopped);
    }

    #[test]
    fn test_tick_before_grace_is_ignored() {
        let state = SchedulerState::WarmingUp.transition(SchedulerEvent::Tick);
        assert_eq!(state, SchedulerState::WarmingUp);
    }
}
