//! Timing and retry budget of a review session.

use std::time::Duration;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(20);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 20;
const DEFAULT_RENEWAL_THRESHOLD: Duration = Duration::from_secs(60);

/// Delays, attempt budget, and token renewal threshold for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    initial_delay: Duration,
    poll_interval: Duration,
    max_attempts: u32,
    renewal_threshold: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            renewal_threshold: DEFAULT_RENEWAL_THRESHOLD,
        }
    }
}

impl PollingPolicy {
    /// Sets the pause between submission and the first poll.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the pause after each `Dispatched` answer.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of polls.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the minimum token validity required when a poll is sent.
    #[must_use]
    pub const fn with_renewal_threshold(mut self, threshold: Duration) -> Self {
        self.renewal_threshold = threshold;
        self
    }

    /// Pause between submission and the first poll.
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Pause after each `Dispatched` answer.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Maximum number of polls.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Minimum token validity required when a poll is sent.
    #[must_use]
    pub const fn renewal_threshold(&self) -> Duration {
        self.renewal_threshold
    }

    /// Total time spent sleeping by a session that times out.
    #[must_use]
    pub const fn worst_case_wait(&self) -> Duration {
        self.initial_delay
            .saturating_add(self.poll_interval.saturating_mul(self.max_attempts))
    }

    /// [`Self::worst_case_wait`] in whole minutes, rounded to nearest, at least one.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "minute granularity is intended for the user-facing message"
    )]
    pub const fn timeout_minutes(&self) -> u64 {
        let minutes = self.worst_case_wait().as_secs().saturating_add(30) / 60;
        if minutes == 0 { 1 } else { minutes }
    }
}
