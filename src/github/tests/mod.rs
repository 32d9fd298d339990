//! Unit tests for the GitHub intake module.

use mockall::predicate::{always, function};
use rstest::rstest;

use super::models::test_support::{sample_change_set, sample_locator};
use super::{
    ChangedFile, DEFAULT_API_BASE, IntakeError, MockPullRequestGateway, PersonalAccessToken,
    PullRequestIntake, PullRequestLocator, PullRequestMetadata, ReviewDraft,
};


#[rstest]
fn builds_locator_from_workflow_context() {
    let locator =
        PullRequestLocator::from_workflow("octo/widgets", "refs/pull/12/merge", DEFAULT_API_BASE)
            .expect("workflow context should parse");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "widgets", "repository mismatch");
    assert_eq!(locator.number().get(), 12_u64, "number mismatch");
    assert_eq!(locator.full_name(), "octo/widgets", "full name mismatch");
    assert_eq!(
        locator.api_base().as_str(),
        "https://api.github.com/",
        "api base mismatch"
    );
}

#[rstest]
fn derives_rest_paths() {
    let locator = sample_locator();
    assert_eq!(locator.pull_request_path(), "/repos/octo/widgets/pulls/42");
    assert_eq!(
        locator.compare_path("abc", "def"),
        "/repos/octo/widgets/compare/abc...def"
    );
    assert_eq!(locator.reviews_path(), "/repos/octo/widgets/pulls/42/reviews");
}

#[rstest]
#[case::no_slash("widgets")]
#[case::nested("octo/widgets/extra")]
fn rejects_malformed_repository(#[case] repository: &str) {
    let result =
        PullRequestLocator::from_workflow(repository, "refs/pull/1/merge", DEFAULT_API_BASE);
    assert!(
        matches!(result, Err(IntakeError::InvalidRepository { .. })),
        "expected InvalidRepository, got {result:?}"
    );
}

#[rstest]
#[case::empty_owner("/widgets")]
#[case::empty_name("octo/")]
fn rejects_blank_repository_parts(#[case] repository: &str) {
    let result =
        PullRequestLocator::from_workflow(repository, "refs/pull/1/merge", DEFAULT_API_BASE);
    assert!(
        matches!(result, Err(IntakeError::MissingRepository)),
        "expected MissingRepository, got {result:?}"
    );
}

#[rstest]
#[case::branch("refs/heads/main")]
#[case::short("refs/pull/7")]
#[case::long("refs/pull/7/merge/extra")]
#[case::head_ref("refs/pull/7/head")]
#[case::empty("")]
fn rejects_non_merge_refs(#[case] git_ref: &str) {
    let result = PullRequestLocator::from_workflow("octo/widgets", git_ref, DEFAULT_API_BASE);
    assert!(
        matches!(result, Err(IntakeError::InvalidGitRef { .. })),
        "expected InvalidGitRef for {git_ref:?}, got {result:?}"
    );
}

#[rstest]
#[case::not_a_number("refs/pull/abc/merge")]
#[case::zero("refs/pull/0/merge")]
#[case::negative("refs/pull/-3/merge")]
fn rejects_invalid_pull_numbers(#[case] git_ref: &str) {
    let result = PullRequestLocator::from_workflow("octo/widgets", git_ref, DEFAULT_API_BASE);
    assert!(
        matches!(result, Err(IntakeError::InvalidPullRequestNumber)),
        "expected InvalidPullRequestNumber, got {result:?}"
    );
}

#[rstest]
fn rejects_invalid_api_base() {
    let result =
        PullRequestLocator::from_workflow("octo/widgets", "refs/pull/1/merge", "not a url");
    assert!(
        matches!(result, Err(IntakeError::InvalidUrl(_))),
        "expected InvalidUrl, got {result:?}"
    );
}

#[rstest]
fn rejects_empty_token() {
    let result = PersonalAccessToken::new("  ");
    assert!(
        matches!(result, Err(IntakeError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn token_debug_output_is_redacted() {
    let token = PersonalAccessToken::new("ghp_secret").expect("token should be accepted");
    assert!(!format!("{token:?}").contains("ghp_secret"));
}

#[tokio::test]
async fn loads_diff_between_base_and_head() {
    let locator = sample_locator();
    let mut gateway = MockPullRequestGateway::new();
    gateway
        .expect_pull_request()
        .with(always())
        .times(1)
        .returning(|_| {
            Ok(PullRequestMetadata {
                number: 42,
                author: Some(String::from("mona")),
                base_sha: String::from("base-sha"),
                head_sha: String::from("head-sha"),
            })
        });
    gateway
        .expect_compare_commits()
        .with(
            always(),
            function(|base: &str| base == "base-sha"),
            function(|head: &str| head == "head-sha"),
        )
        .times(1)
        .returning(|_, _, _| {
            Ok(vec![
                ChangedFile {
                    filename: String::from("b.rs"),
                    status: String::from("added"),
                    patch: Some(String::from("+fn b() {}")),
                },
                ChangedFile {
                    filename: String::from("a.png"),
                    status: String::from("modified"),
                    patch: None,
                },
            ])
        });

    let intake = PullRequestIntake::new(&gateway);
    let metadata = intake
        .metadata(&locator)
        .await
        .expect("metadata should load");
    let change_set = intake
        .change_set(&locator, metadata)
        .await
        .expect("intake should succeed");

    assert_eq!(change_set.author, "mona", "author mismatch");
    let names: Vec<&str> = change_set
        .files
        .iter()
        .map(|file| file.filename.as_str())
        .collect();
    assert_eq!(names, ["b.rs", "a.png"], "file order should be preserved");
}

#[tokio::test]
async fn intake_stops_when_pull_request_lookup_fails() {
    let mut gateway = MockPullRequestGateway::new();
    gateway.expect_pull_request().returning(|_| {
        Err(IntakeError::Authentication {
            message: String::from("bad credentials"),
        })
    });
    gateway.expect_compare_commits().never();

    let result = PullRequestIntake::new(&gateway)
        .metadata(&sample_locator())
        .await;

    assert!(
        matches!(result, Err(IntakeError::Authentication { .. })),
        "expected Authentication, got {result:?}"
    );
}

#[rstest]
fn change_set_converts_to_review_request() {
    let mut change_set = sample_change_set("mona");
    change_set.files.push(ChangedFile {
        filename: String::from("logo.png"),
        status: String::from("added"),
        patch: None,
    });

    let request = change_set.to_review_request();

    assert_eq!(request.github_account_name, "octo");
    assert_eq!(request.repository_name, "widgets");
    assert_eq!(request.pull_number, 42);
    assert_eq!(request.pull_request_author, "mona");
    assert_eq!(request.file_changes.len(), 2);
    assert_eq!(
        request.file_changes.get(1).map(|change| change.patch.as_str()),
        Some(""),
        "missing patches should be sent as empty strings"
    );
}

#[rstest]
fn review_drafts_are_comments() {
    let draft = ReviewDraft::comment(String::from("hello"));
    assert_eq!(
        serde_json::to_value(&draft).expect("draft should serialise"),
        serde_json::json!({"body": "hello", "event": "COMMENT"})
    );
}
