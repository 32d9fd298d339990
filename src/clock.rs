//! Wall-clock access for expiry arithmetic.

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Token renewal decisions read time through this trait so that tests can
/// tie expiry arithmetic to a paused Tokio clock.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test helpers for driving time-dependent code.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use chrono::{DateTime, TimeDelta, Utc};
    use tokio::time::Instant;

    use super::Clock;

    /// Clock that advances with Tokio's (possibly paused) timer.
    ///
    /// Wall time is anchored when the clock is created; afterwards it moves
    /// forward exactly as far as `tokio::time::Instant` does, so
    /// `tokio::time::pause` and auto-advance keep expiry checks consistent
    /// with the sleeps that the session performs.
    #[derive(Debug, Clone, Copy)]
    pub struct TokioClock {
        wall_origin: DateTime<Utc>,
        instant_origin: Instant,
    }

    impl TokioClock {
        /// Anchors a clock at `wall_origin`.
        #[must_use]
        pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
            Self {
                wall_origin,
                instant_origin: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = self.instant_origin.elapsed();
            let delta = TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::MAX);
            self.wall_origin
                .checked_add_signed(delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        }
    }
}
