//! Submission and polling state machine for one review run.
//!
//! A session submits the change set once, waits for the service to pick it
//! up, and then polls until the review finishes, fails, or the attempt
//! budget runs out. Before every poll the current identity token is checked
//! against the renewal threshold and replaced when it is about to expire.

use std::sync::Arc;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::client::ReviewService;
use super::error::ReviewServiceError;
use super::model::{ReviewRequest, ReviewStatus, ReviewSubmission};
use super::policy::PollingPolicy;
use crate::clock::{Clock, SystemClock};
use crate::identity::{IdentityError, IdentityToken, IdentityTokenSource};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

const UNSPECIFIED_SERVICE_ERROR: &str = "review service reported an error without details";

/// Terminal result of a review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The service finished the review or declined to review.
    Succeeded {
        /// Polls performed.
        attempts: u32,
        /// Whether the service wrote comments to the pull request.
        comments_created: bool,
        /// Whether the service declined the submission.
        review_skipped: bool,
    },
    /// The service reported that the review failed.
    Errored {
        /// Polls performed, including the one that reported the error.
        attempts: u32,
        /// Failure detail reported by the service.
        message: String,
    },
    /// The attempt budget ran out while the review was still dispatched.
    TimedOut {
        /// Polls performed.
        attempts: u32,
    },
}

impl SessionOutcome {
    /// Number of polls the session performed.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Errored { attempts, .. }
            | Self::TimedOut { attempts } => *attempts,
        }
    }

    /// Short machine-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Errored { .. } => "errored",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}

/// Result of a single poll, consumed within one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The review is still being produced.
    Pending,
    /// The review is complete.
    Completed {
        /// Whether comments were written to the pull request.
        comments_created: bool,
    },
    /// The service reported a failure.
    Failed(String),
    /// The poll itself could not be completed.
    TransportError(ReviewServiceError),
}

/// Failures that abort a session before a terminal outcome is reached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Token issuance or verification failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Submission or polling failed at the transport level.
    #[error(transparent)]
    Review(#[from] ReviewServiceError),
}

struct PollingSession {
    token: IdentityToken,
    submission: ReviewSubmission,
    attempts: u32,
}

enum SessionState {
    Submitting,
    WaitingInitialDelay(PollingSession),
    Polling(PollingSession),
    Finished(SessionOutcome),
}

/// Drives one submission through to a [`SessionOutcome`].
pub struct SubmissionOrchestrator<'a, S: ?Sized, I: ?Sized> {
    service: &'a S,
    identity: &'a I,
    policy: PollingPolicy,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<'a, S, I> SubmissionOrchestrator<'a, S, I>
where
    S: ReviewService + ?Sized,
    I: IdentityTokenSource + ?Sized,
{
    /// Creates an orchestrator using the system clock and no telemetry.
    #[must_use]
    pub fn new(service: &'a S, identity: &'a I, policy: PollingPolicy) -> Self {
        Self {
            service,
            identity,
            policy,
            clock: Arc::new(SystemClock),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Replaces the clock used for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Submits `request` and polls until a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when a token cannot be obtained, the
    /// submission is rejected, or a poll fails at the transport level.
    pub async fn run(&self, request: &ReviewRequest) -> Result<SessionOutcome, SessionError> {
        let mut state = SessionState::Submitting;
        loop {
            state = match state {
                SessionState::Submitting => self.submit(request).await?,
                SessionState::WaitingInitialDelay(session) => {
                    debug!(
                        delay_seconds = self.policy.initial_delay().as_secs(),
                        "waiting before the first poll"
                    );
                    sleep(self.policy.initial_delay()).await;
                    SessionState::Polling(session)
                }
                SessionState::Polling(session) => self.poll_next(session).await?,
                SessionState::Finished(outcome) => {
                    self.finish(&outcome);
                    return Ok(outcome);
                }
            };
        }
    }

    async fn submit(&self, request: &ReviewRequest) -> Result<SessionState, SessionError> {
        let token = self.identity.acquire().await?;
        let receipt = self.service.submit(token.bearer(), request).await?;

        if receipt.review_skipped {
            info!(repository = %receipt.full_repo_name, "review service skipped this change set");
            self.telemetry.record(TelemetryEvent::ReviewSkipped {
                full_repo_name: receipt.full_repo_name,
            });
            return Ok(SessionState::Finished(SessionOutcome::Succeeded {
                attempts: 0,
                comments_created: false,
                review_skipped: true,
            }));
        }

        info!(
            repository = %receipt.full_repo_name,
            review_id = %receipt.code_review_id,
            "change set submitted for review"
        );
        self.telemetry.record(TelemetryEvent::ReviewSubmitted {
            full_repo_name: receipt.full_repo_name.clone(),
            review_id: receipt.code_review_id.clone(),
            file_count: request.file_changes.len(),
        });

        Ok(SessionState::WaitingInitialDelay(PollingSession {
            token,
            submission: receipt.submission(),
            attempts: 0,
        }))
    }

    async fn poll_next(&self, mut session: PollingSession) -> Result<SessionState, SessionError> {
        if session.attempts >= self.policy.max_attempts() {
            return Ok(SessionState::Finished(SessionOutcome::TimedOut {
                attempts: session.attempts,
            }));
        }

        let attempt = session.attempts.saturating_add(1);
        self.ensure_fresh_token(&mut session, attempt).await?;
        let outcome = self.poll(&session, attempt).await;
        session.attempts = attempt;

        match outcome {
            PollOutcome::Pending => {
                sleep(self.policy.poll_interval()).await;
                Ok(SessionState::Polling(session))
            }
            PollOutcome::Completed { comments_created } => {
                Ok(SessionState::Finished(SessionOutcome::Succeeded {
                    attempts: attempt,
                    comments_created,
                    review_skipped: false,
                }))
            }
            PollOutcome::Failed(message) => Ok(SessionState::Finished(SessionOutcome::Errored {
                attempts: attempt,
                message,
            })),
            PollOutcome::TransportError(error) => Err(error.into()),
        }
    }

    async fn ensure_fresh_token(
        &self,
        session: &mut PollingSession,
        attempt: u32,
    ) -> Result<(), IdentityError> {
        let threshold = self.policy.renewal_threshold();
        let now = self.clock.now();
        if !session.token.needs_renewal(now, threshold) {
            return Ok(());
        }

        let remaining = session.token.remaining_validity(now);
        warn!(
            attempt,
            remaining_seconds = remaining.as_secs(),
            "identity token nears expiry; requesting a new one"
        );
        let renewed = self.identity.acquire().await?;

        let renewed_remaining = renewed.remaining_validity(self.clock.now());
        if renewed_remaining < threshold {
            return Err(IdentityError::InsufficientValidity {
                remaining_seconds: renewed_remaining.as_secs(),
                threshold_seconds: threshold.as_secs(),
            });
        }

        self.telemetry.record(TelemetryEvent::TokenRenewed {
            attempt,
            remaining_seconds: remaining.as_secs(),
        });
        session.token = renewed;
        Ok(())
    }

    async fn poll(&self, session: &PollingSession, attempt: u32) -> PollOutcome {
        let status = match self
            .service
            .fetch_comments(session.token.bearer(), &session.submission)
            .await
        {
            Ok(status) => status,
            Err(error) => return PollOutcome::TransportError(error),
        };

        debug!(
            attempt,
            status = status.status.as_str(),
            wait_in_seconds = status.wait_in_seconds,
            "polled review status"
        );
        self.telemetry.record(TelemetryEvent::PollAttempted {
            attempt,
            status: status.status.as_str().to_owned(),
        });

        match status.status {
            ReviewStatus::Dispatched => PollOutcome::Pending,
            ReviewStatus::Succeeded => PollOutcome::Completed {
                comments_created: status.comments_created,
            },
            ReviewStatus::Error => PollOutcome::Failed(
                status
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_SERVICE_ERROR.to_owned()),
            ),
        }
    }

    fn finish(&self, outcome: &SessionOutcome) {
        match outcome {
            SessionOutcome::Succeeded { .. } => {
                info!(attempts = outcome.attempts(), "review session succeeded");
            }
            SessionOutcome::Errored { message, .. } => {
                warn!(attempts = outcome.attempts(), %message, "review service reported an error");
            }
            SessionOutcome::TimedOut { .. } => {
                warn!(attempts = outcome.attempts(), "review session timed out");
            }
        }
        self.telemetry.record(TelemetryEvent::SessionFinished {
            outcome: outcome.label().to_owned(),
            attempts: outcome.attempts(),
        });
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
