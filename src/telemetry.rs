//! Run telemetry events and sinks.
//!
//! Telemetry complements the `tracing` output with a small set of typed
//! events describing how a review session progressed. Events are only
//! written locally; nothing is transmitted.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted during a review run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// The change set was accepted by the review service.
    ReviewSubmitted {
        /// `owner/repo` the review belongs to.
        full_repo_name: String,
        /// Identifier returned by the service.
        review_id: String,
        /// Number of changed files in the submission.
        file_count: usize,
    },
    /// The service declined to review the change set.
    ReviewSkipped {
        /// `owner/repo` the review belongs to.
        full_repo_name: String,
    },
    /// A fresh identity token replaced one nearing expiry.
    TokenRenewed {
        /// Poll attempt the renewal preceded (1-based).
        attempt: u32,
        /// Seconds of validity the replaced token had left.
        remaining_seconds: u64,
    },
    /// One fetch-comments poll completed.
    PollAttempted {
        /// Poll attempt number (1-based).
        attempt: u32,
        /// Status string reported by the service.
        status: String,
    },
    /// The session reached a terminal outcome.
    SessionFinished {
        /// Outcome label (`succeeded`, `errored`, `timed_out`).
        outcome: String,
        /// Polls performed before the outcome was reached.
        attempts: u32,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// Enabled in debug mode so that pipeline logs carry the session trace.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sinks for asserting on emitted events.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    /// Sink that keeps every event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingTelemetrySink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingTelemetrySink {
        /// Drains and returns the recorded events.
        ///
        /// # Panics
        ///
        /// Panics if the event mutex was poisoned.
        #[expect(clippy::expect_used, reason = "test helper; poisoning is a test bug")]
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .expect("events mutex should be available")
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingTelemetrySink {
        #[expect(clippy::expect_used, reason = "test helper; poisoning is a test bug")]
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .expect("events mutex should be available")
                .push(event);
        }
    }
}
