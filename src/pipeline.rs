//! One relay run: intake, review session, and fallback review.
//!
//! [`run_from_config`] wires the production clients together;
//! [`ReviewPipeline`] holds the run logic against the gateway, service, and
//! identity traits so it can be exercised with mocks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::annotations::AnnotationLevel;
use crate::clock::{Clock, SystemClock};
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::github::{
    IntakeError, OctocrabGateway, PersonalAccessToken, PullRequestGateway, PullRequestIntake,
    PullRequestLocator, ReviewDraft,
};
use crate::identity::{IdentityTokenProvider, IdentityTokenSource, TokenValidator, ValidatedTokenSource};
use crate::review::{
    PollingPolicy, ReviewService, ReviewServiceClient, SessionOutcome, SubmissionOrchestrator,
    error_review_body, timeout_review_body,
};
use crate::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};

/// The only event that triggers a review.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Authors whose pull requests are never reviewed.
pub const DEPENDENCY_BOTS: [&str; 2] = ["dependabot[bot]", "renovate[bot]"];

/// Rejects every event except `pull_request`, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`IntakeError::UnsupportedEvent`] for any other event.
pub fn require_pull_request_event(event: &str) -> Result<(), IntakeError> {
    if event.trim().eq_ignore_ascii_case(PULL_REQUEST_EVENT) {
        Ok(())
    } else {
        Err(IntakeError::UnsupportedEvent {
            event: event.to_owned(),
        })
    }
}

/// Returns true for logins listed in [`DEPENDENCY_BOTS`], ignoring ASCII case.
#[must_use]
pub fn is_dependency_bot(author: &str) -> bool {
    DEPENDENCY_BOTS
        .iter()
        .any(|bot| bot.eq_ignore_ascii_case(author))
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pull request was opened by a dependency bot and not submitted.
    BotSkipped {
        /// Bot login.
        author: String,
    },
    /// A review session ran to a terminal outcome.
    Session(SessionOutcome),
}

/// Result of a run, ready to be reported to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Identifier of the fallback review posted on the pull request, if any.
    pub fallback_review_id: Option<u64>,
    /// Annotation severity for the run summary.
    pub level: AnnotationLevel,
    /// One-line summary for the workflow log.
    pub summary: String,
}

impl RunReport {
    /// Returns false when the run should fail the workflow job.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(
            self.outcome,
            RunOutcome::Session(SessionOutcome::TimedOut { .. })
        )
    }
}

/// Runs one pull request through intake, review, and fallback posting.
pub struct ReviewPipeline<'a, G: ?Sized, S: ?Sized, I: ?Sized> {
    gateway: &'a G,
    service: &'a S,
    identity: &'a I,
    policy: PollingPolicy,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<'a, G, S, I> ReviewPipeline<'a, G, S, I>
where
    G: PullRequestGateway + ?Sized,
    S: ReviewService + ?Sized,
    I: IdentityTokenSource + ?Sized,
{
    /// Creates a pipeline using the system clock and no telemetry.
    #[must_use]
    pub fn new(gateway: &'a G, service: &'a S, identity: &'a I, policy: PollingPolicy) -> Self {
        Self {
            gateway,
            service,
            identity,
            policy,
            clock: Arc::new(SystemClock),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Replaces the clock used for token expiry checks.
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

    /// Reviews the pull request at `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] when intake, token acquisition, submission,
    /// polling, or fallback posting fails.
    pub async fn run(&self, locator: &PullRequestLocator) -> Result<RunReport, RelayError> {
        let intake = PullRequestIntake::new(self.gateway);
        let metadata = intake.metadata(locator).await?;
        if let Some(author) = metadata.author.as_deref().filter(|login| is_dependency_bot(login)) {
            info!(%author, "skipping review of dependency bot pull request");
            return Ok(RunReport {
                summary: format!("Skipping AI review: pull request opened by {author}"),
                outcome: RunOutcome::BotSkipped {
                    author: author.to_owned(),
                },
                fallback_review_id: None,
                level: AnnotationLevel::Notice,
            });
        }

        let change_set = intake.change_set(locator, metadata).await?;
        let outcome = SubmissionOrchestrator::new(self.service, self.identity, self.policy)
            .with_clock(Arc::clone(&self.clock))
            .with_telemetry(Arc::clone(&self.telemetry))
            .run(&change_set.to_review_request())
            .await?;

        let (level, summary, fallback_body) = self.describe(&outcome);
        let fallback_review_id = match fallback_body {
            Some(body) => {
                warn!(outcome = outcome.label(), "posting fallback review");
                let draft = ReviewDraft::comment(body);
                Some(self.gateway.create_review(locator, &draft).await?)
            }
            None => None,
        };

        Ok(RunReport {
            outcome: RunOutcome::Session(outcome),
            fallback_review_id,
            level,
            summary,
        })
    }

    fn describe(&self, outcome: &SessionOutcome) -> (AnnotationLevel, String, Option<String>) {
        match outcome {
            SessionOutcome::Succeeded {
                review_skipped: true,
                ..
            } => (
                AnnotationLevel::Notice,
                "Review service skipped this pull request".to_owned(),
                None,
            ),
            SessionOutcome::Succeeded {
                attempts,
                comments_created,
                ..
            } => (
                AnnotationLevel::Notice,
                format!(
                    "AI review completed after {attempts} polls (comments created: {comments_created})"
                ),
                None,
            ),
            SessionOutcome::Errored { message, .. } => (
                AnnotationLevel::Notice,
                format!("AI reviewer reported an error; fallback review posted: {message}"),
                Some(error_review_body(message)),
            ),
            SessionOutcome::TimedOut { .. } => {
                let body = timeout_review_body(&self.policy);
                (AnnotationLevel::Warning, body.clone(), Some(body))
            }
        }
    }
}

/// Builds the production clients from `config` and runs the pipeline.
///
/// Every required value is resolved before the first network call.
///
/// # Errors
///
/// Returns [`RelayError`] for missing or invalid configuration and for any
/// failure reported by [`ReviewPipeline::run`].
pub async fn run_from_config(config: &RelayConfig) -> Result<RunReport, RelayError> {
    require_pull_request_event(&config.resolve_event_name()?)?;
    let locator = PullRequestLocator::from_workflow(
        &config.resolve_repository()?,
        &config.resolve_git_ref()?,
        &config.resolve_github_api_url(),
    )?;
    let token = PersonalAccessToken::new(config.resolve_github_token()?)?;
    let credentials = config.identity_credentials()?;
    let audience = config.resolve_audience()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .map_err(|error| RelayError::Configuration {
            message: format!("failed to build HTTP client: {error}"),
        })?;
    let service = ReviewServiceClient::new(http.clone(), config.require_api_endpoint()?)?;
    let provider = IdentityTokenProvider::new(http.clone(), credentials, &audience)?;
    let validator = TokenValidator::new(http, &config.jwks_url)?;
    let identity = ValidatedTokenSource::new(provider, validator);
    let gateway = OctocrabGateway::for_token(&token, &locator)?;

    let telemetry: Arc<dyn TelemetrySink> = if config.debug_enabled() {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };

    info!(
        repository = %locator.full_name(),
        pull_request = locator.number().get(),
        "starting AI review"
    );
    ReviewPipeline::new(&gateway, &service, &identity, config.polling_policy())
        .with_telemetry(telemetry)
        .run(&locator)
        .await
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
