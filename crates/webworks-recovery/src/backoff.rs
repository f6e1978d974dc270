//! Exponential backoff schedule

use std::time::Duration;
use webworks_core::RecoveryConfig;

/// Doubling retry interval clamped to a maximum
///
/// [`Backoff::advance`] hands out the current interval and grows the next
/// one, so a fresh schedule yields `initial, 2*initial, 4*initial, ...` until
/// it reaches `max`, then `max` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// First interval when no configuration is given
    pub const DEFAULT_INITIAL: Duration = Duration::from_secs(2);

    /// Ceiling when no configuration is given (ten hours)
    pub const DEFAULT_MAX: Duration = Duration::from_secs(36_000);

    /// Create a schedule; `max` is raised to `initial` if smaller
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Build the schedule described by a recovery configuration
    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self::new(config.initial_interval(), config.max_interval())
    }

    /// Interval the next wait will use
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Return the interval to wait now and double the following one
    pub fn advance(&mut self) -> Duration {
        let interval = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        interval
    }

    /// Go back to the initial interval
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL, Self::DEFAULT_MAX)
    }
}
