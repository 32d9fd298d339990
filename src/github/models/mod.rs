//! Data models representing pull request metadata and diffs.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into public domain types.

use serde::{Deserialize, Serialize};

use crate::review::{FileChange, ReviewRequest};

use super::locator::PullRequestLocator;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Pull request metadata needed to build a review submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestMetadata {
    /// Pull request number.
    pub number: u64,
    /// Author login if present.
    pub author: Option<String>,
    /// Commit the pull request targets.
    pub base_sha: String,
    /// Latest commit of the pull request branch.
    pub head_sha: String,
}

/// One file in a commit comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Repository-relative path.
    pub filename: String,
    /// Change kind (`added`, `modified`, `removed`, `renamed`, ...).
    pub status: String,
    /// Unified diff; GitHub omits it for binary and very large files.
    pub patch: Option<String>,
}

/// Everything the review service needs to know about a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Pull request being reviewed.
    pub locator: PullRequestLocator,
    /// Author login; empty when GitHub did not report one.
    pub author: String,
    /// Changed files in comparison order.
    pub files: Vec<ChangedFile>,
}

impl ChangeSet {
    /// Converts the change set into a review service submission.
    #[must_use]
    pub fn to_review_request(&self) -> ReviewRequest {
        ReviewRequest {
            github_account_name: self.locator.owner().as_str().to_owned(),
            repository_name: self.locator.repository().as_str().to_owned(),
            pull_number: self.locator.number().get(),
            pull_request_author: self.author.clone(),
            file_changes: self
                .files
                .iter()
                .map(|file| FileChange {
                    file: file.filename.clone(),
                    status: file.status.clone(),
                    patch: file.patch.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Body of a pull request review posted by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDraft {
    /// Markdown body.
    pub body: String,
    /// Review event; the relay only ever comments.
    pub event: &'static str,
}

impl ReviewDraft {
    /// Creates a plain comment review.
    #[must_use]
    pub const fn comment(body: String) -> Self {
        Self {
            body,
            event: "COMMENT",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) user: Option<ApiUser>,
    pub(super) base: ApiCommitRef,
    pub(super) head: ApiCommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommitRef {
    pub(super) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiComparison {
    #[serde(default)]
    pub(super) files: Vec<ApiChangedFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiChangedFile {
    pub(super) filename: String,
    pub(super) status: String,
    pub(super) patch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiReview {
    pub(super) id: u64,
}

impl From<ApiPullRequest> for PullRequestMetadata {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            author: value.user.and_then(|user| user.login),
            base_sha: value.base.sha,
            head_sha: value.head.sha,
        }
    }
}

impl From<ApiChangedFile> for ChangedFile {
    fn from(value: ApiChangedFile) -> Self {
        Self {
            filename: value.filename,
            status: value.status,
            patch: value.patch,
        }
    }
}
