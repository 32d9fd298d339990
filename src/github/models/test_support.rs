//! Test helpers for GitHub REST payloads and change set fixtures.
//!
//! The JSON builders produce the subset of fields the gateway reads, so
//! tests can mount them on a mock server without restating the schema.

use serde_json::{Value, json};

use super::{ChangeSet, ChangedFile};
use crate::github::locator::{DEFAULT_API_BASE, PullRequestLocator};

/// Pull request response body as returned by `GET /repos/{o}/{r}/pulls/{n}`.
#[must_use]
pub fn pull_request_json(number: u64, author: &str, base_sha: &str, head_sha: &str) -> Value {
    json!({
        "number": number,
        "state": "open",
        "user": { "login": author },
        "base": { "ref": "main", "sha": base_sha },
        "head": { "ref": "feature", "sha": head_sha }
    })
}

/// Comparison response body listing `files` as `(filename, status, patch)`.
#[must_use]
pub fn comparison_json(files: &[(&str, &str, Option<&str>)]) -> Value {
    let entries: Vec<Value> = files
        .iter()
        .map(|(filename, status, patch)| match patch {
            Some(diff) => json!({ "filename": filename, "status": status, "patch": diff }),
            None => json!({ "filename": filename, "status": status }),
        })
        .collect();
    json!({ "status": "ahead", "files": entries })
}

/// Locator for `octo/widgets#42` on the public API.
///
/// # Panics
///
/// Panics if the built-in fixture values stop parsing.
#[must_use]
#[expect(clippy::expect_used, reason = "fixed fixture inputs are valid")]
pub fn sample_locator() -> PullRequestLocator {
    PullRequestLocator::from_workflow("octo/widgets", "refs/pull/42/merge", DEFAULT_API_BASE)
        .expect("sample locator should parse")
}

/// Change set for `octo/widgets#42` authored by `author` with one modified file.
#[must_use]
pub fn sample_change_set(author: &str) -> ChangeSet {
    ChangeSet {
        locator: sample_locator(),
        author: author.to_owned(),
        files: vec![ChangedFile {
            filename: "src/lib.rs".to_owned(),
            status: "modified".to_owned(),
            patch: Some("@@ -1 +1 @@\n-old\n+new".to_owned()),
        }],
    }
}
