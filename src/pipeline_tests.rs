//! Unit tests for the relay pipeline.

use chrono::{TimeDelta, Utc};
use mockall::predicate::{always, function};
use rstest::rstest;
use serde_json::Map;

use super::{
    ReviewPipeline, RunOutcome, is_dependency_bot, require_pull_request_event, run_from_config,
};
use crate::RelayConfig;
use crate::annotations::AnnotationLevel;
use crate::error::RelayError;
use crate::github::models::test_support::sample_locator;
use crate::github::{ChangedFile, IntakeError, MockPullRequestGateway, PullRequestMetadata, ReviewDraft};
use crate::identity::{IdentityError, IdentityToken, MockIdentityTokenSource};
use crate::review::{
    CommentsStatus, MockReviewService, PollingPolicy, ReviewServiceError, ReviewStatus,
    SessionOutcome, SubmissionReceipt,
};

#[rstest]
#[case::exact("pull_request")]
#[case::upper("PULL_REQUEST")]
#[case::padded(" pull_request ")]
fn accepts_pull_request_events(#[case] event: &str) {
    assert_eq!(require_pull_request_event(event), Ok(()));
}

#[rstest]
#[case::push("push")]
#[case::target("pull_request_target")]
#[case::empty("")]
fn rejects_other_events(#[case] event: &str) {
    assert_eq!(
        require_pull_request_event(event),
        Err(IntakeError::UnsupportedEvent {
            event: event.to_owned()
        })
    );
}

#[rstest]
#[case("dependabot[bot]", true)]
#[case("Renovate[bot]", true)]
#[case("dependabot", false)]
#[case("mona", false)]
fn recognises_dependency_bots(#[case] author: &str, #[case] expected: bool) {
    assert_eq!(is_dependency_bot(author), expected);
}

fn gateway_for(author: &str) -> MockPullRequestGateway {
    let login = author.to_owned();
    let mut gateway = MockPullRequestGateway::new();
    gateway.expect_pull_request().returning(move |_| {
        Ok(PullRequestMetadata {
            number: 42,
            author: Some(login.clone()),
            base_sha: "base".to_owned(),
            head_sha: "head".to_owned(),
        })
    });
    gateway.expect_compare_commits().returning(|_, _, _| {
        Ok(vec![ChangedFile {
            filename: "src/lib.rs".to_owned(),
            status: "modified".to_owned(),
            patch: Some("@@".to_owned()),
        }])
    });
    gateway
}

fn identity() -> MockIdentityTokenSource {
    let mut identity = MockIdentityTokenSource::new();
    identity.expect_acquire().returning(|| {
        Ok(IdentityToken::new(
            "bearer".to_owned(),
            Utc::now() + TimeDelta::hours(1),
            Map::new(),
        ))
    });
    identity
}

fn service_reporting(state: ReviewStatus, error: Option<&'static str>) -> MockReviewService {
    let mut service = MockReviewService::new();
    service.expect_submit().times(1).returning(|_, request| {
        assert_eq!(request.pull_request_author, "mona");
        assert_eq!(request.file_changes.len(), 1);
        Ok(SubmissionReceipt {
            full_repo_name: "octo/widgets".to_owned(),
            code_review_id: "review-1".to_owned(),
            review_skipped: false,
        })
    });
    service.expect_fetch_comments().returning(move |_, _| {
        Ok(CommentsStatus {
            status: state,
            error: error.map(ToOwned::to_owned),
            wait_in_seconds: 0,
            comments_created: state == ReviewStatus::Succeeded,
        })
    });
    service
}

#[tokio::test(start_paused = true)]
async fn dependency_bot_pull_requests_are_not_submitted() {
    let mut gateway = MockPullRequestGateway::new();
    gateway.expect_pull_request().returning(|_| {
        Ok(PullRequestMetadata {
            number: 42,
            author: Some("dependabot[bot]".to_owned()),
            base_sha: "base".to_owned(),
            head_sha: "head".to_owned(),
        })
    });
    gateway.expect_compare_commits().never();
    gateway.expect_create_review().never();
    let mut service = MockReviewService::new();
    service.expect_submit().never();
    let mut identity = MockIdentityTokenSource::new();
    identity.expect_acquire().never();

    let report = ReviewPipeline::new(&gateway, &service, &identity, PollingPolicy::default())
        .run(&sample_locator())
        .await
        .expect("run should finish");

    assert_eq!(
        report.outcome,
        RunOutcome::BotSkipped {
            author: "dependabot[bot]".to_owned()
        }
    );
    assert!(report.is_success());
    assert_eq!(report.level, AnnotationLevel::Notice);
}

#[tokio::test(start_paused = true)]
async fn successful_review_posts_nothing() {
    let mut gateway = gateway_for("mona");
    gateway.expect_create_review().never();
    let service = service_reporting(ReviewStatus::Succeeded, None);
    let identity = identity();

    let report = ReviewPipeline::new(&gateway, &service, &identity, PollingPolicy::default())
        .run(&sample_locator())
        .await
        .expect("run should finish");

    assert_eq!(
        report.outcome,
        RunOutcome::Session(SessionOutcome::Succeeded {
            attempts: 1,
            comments_created: true,
            review_skipped: false,
        })
    );
    assert_eq!(report.fallback_review_id, None);
    assert!(report.is_success());
}

#[tokio::test(start_paused = true)]
async fn service_error_posts_fallback_and_succeeds() {
    let mut gateway = gateway_for("mona");
    gateway
        .expect_create_review()
        .with(
            always(),
            function(|draft: &ReviewDraft| {
                draft.event == "COMMENT"
                    && draft.body
                        == "Error while using the AI code reviewer. \nError details:quota exhausted"
            }),
        )
        .times(1)
        .returning(|_, _| Ok(7));
    let service = service_reporting(ReviewStatus::Error, Some("quota exhausted"));
    let identity = identity();

    let report = ReviewPipeline::new(&gateway, &service, &identity, PollingPolicy::default())
        .run(&sample_locator())
        .await
        .expect("run should finish");

    assert_eq!(report.fallback_review_id, Some(7));
    assert!(report.is_success(), "service errors do not fail the job");
    assert_eq!(report.level, AnnotationLevel::Notice);
}

#[tokio::test(start_paused = true)]
async fn timeout_posts_fallback_and_fails() {
    let mut gateway = gateway_for("mona");
    gateway
        .expect_create_review()
        .with(
            always(),
            function(|draft: &ReviewDraft| {
                draft.body == "AI code reviewer request timed out after 10 minutes"
            }),
        )
        .times(1)
        .returning(|_, _| Ok(8));
    let service = service_reporting(ReviewStatus::Dispatched, None);
    let identity = identity();

    let report = ReviewPipeline::new(&gateway, &service, &identity, PollingPolicy::default())
        .run(&sample_locator())
        .await
        .expect("run should finish");

    assert_eq!(
        report.outcome,
        RunOutcome::Session(SessionOutcome::TimedOut { attempts: 20 })
    );
    assert!(!report.is_success(), "timeouts fail the job");
    assert_eq!(report.level, AnnotationLevel::Warning);
    assert_eq!(
        report.summary,
        "AI code reviewer request timed out after 10 minutes"
    );
}

#[tokio::test(start_paused = true)]
async fn session_errors_propagate_without_fallback() {
    let mut gateway = gateway_for("mona");
    gateway.expect_create_review().never();
    let mut service = MockReviewService::new();
    service.expect_submit().returning(|_, _| {
        Err(ReviewServiceError::SubmissionRejected {
            message: "unexpected status code 401".to_owned(),
        })
    });
    let identity = identity();

    let error = ReviewPipeline::new(&gateway, &service, &identity, PollingPolicy::default())
        .run(&sample_locator())
        .await
        .expect_err("rejected submission should abort");

    assert!(matches!(
        error,
        RelayError::Review(ReviewServiceError::SubmissionRejected { .. })
    ));
}

fn complete_config() -> RelayConfig {
    RelayConfig {
        api_endpoint: Some("http://127.0.0.1:9".to_owned()),
        github_token: Some("ghp_token".to_owned()),
        github_api_url: Some("http://127.0.0.1:9".to_owned()),
        repository: Some("octo/widgets".to_owned()),
        event_name: Some("pull_request".to_owned()),
        git_ref: Some("refs/pull/42/merge".to_owned()),
        id_token_request_url: Some("http://127.0.0.1:9/token".to_owned()),
        id_token_request_token: Some("request-token".to_owned()),
        ..Default::default()
    }
}

#[tokio::test]
async fn non_pull_request_events_stop_before_any_request() {
    let config = RelayConfig {
        event_name: Some("push".to_owned()),
        ..complete_config()
    };

    let error = run_from_config(&config)
        .await
        .expect_err("push events should be rejected");

    assert_eq!(
        error,
        RelayError::Intake(IntakeError::UnsupportedEvent {
            event: "push".to_owned()
        })
    );
}

#[tokio::test]
async fn missing_identity_credentials_stop_before_any_request() {
    let _guard = env_lock::lock_env([
        ("ACTIONS_ID_TOKEN_REQUEST_URL", None::<&str>),
        ("ACTIONS_ID_TOKEN_REQUEST_TOKEN", None::<&str>),
    ]);
    let config = RelayConfig {
        id_token_request_url: None,
        ..complete_config()
    };

    let error = run_from_config(&config)
        .await
        .expect_err("missing credentials should be rejected");

    assert_eq!(
        error,
        RelayError::Identity(IdentityError::MissingCredential {
            name: "ACTIONS_ID_TOKEN_REQUEST_URL"
        })
    );
}

#[tokio::test]
async fn malformed_git_ref_is_rejected() {
    let config = RelayConfig {
        git_ref: Some("refs/heads/main".to_owned()),
        ..complete_config()
    };

    let error = run_from_config(&config)
        .await
        .expect_err("branch refs should be rejected");

    assert!(matches!(
        error,
        RelayError::Intake(IntakeError::InvalidGitRef { .. })
    ));
}
