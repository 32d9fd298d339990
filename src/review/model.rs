//! Wire models exchanged with the review service.

use serde::{Deserialize, Serialize};

/// One changed file in the submitted diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Repository-relative path.
    pub file: String,
    /// Change status as reported by the hosting API (`added`, `modified`, ...).
    pub status: String,
    /// Unified diff text; empty for binary or oversized files.
    pub patch: String,
}

/// Body of a submit-for-review request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRequest {
    /// Repository owner (user or organisation).
    pub github_account_name: String,
    /// Repository name without the owner.
    pub repository_name: String,
    /// Pull request number.
    pub pull_number: u64,
    /// Login of the pull request author.
    pub pull_request_author: String,
    /// Changed files in the order the hosting API listed them.
    pub file_changes: Vec<FileChange>,
}

/// Response to a submit-for-review request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionReceipt {
    /// `owner/repo` as recorded by the service.
    pub full_repo_name: String,
    /// Opaque identifier of the queued review.
    pub code_review_id: String,
    /// Set when the service decided not to review this change.
    #[serde(default)]
    pub review_skipped: bool,
}

impl SubmissionReceipt {
    /// Correlation key for polling this review.
    #[must_use]
    pub fn submission(&self) -> ReviewSubmission {
        ReviewSubmission::new(self.full_repo_name.clone(), self.code_review_id.clone())
    }
}

/// Identifies the single outstanding review of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    full_repo_name: String,
    review_id: String,
}

impl ReviewSubmission {
    /// Creates a correlation key.
    #[must_use]
    pub const fn new(full_repo_name: String, review_id: String) -> Self {
        Self {
            full_repo_name,
            review_id,
        }
    }

    /// `owner/repo` of the reviewed repository.
    #[must_use]
    pub const fn full_repo_name(&self) -> &str {
        self.full_repo_name.as_str()
    }

    /// Identifier returned by the service at submission time.
    #[must_use]
    pub const fn review_id(&self) -> &str {
        self.review_id.as_str()
    }
}

/// Processing state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReviewStatus {
    /// Work has been handed off but is not finished.
    Dispatched,
    /// Review comments have been produced.
    Succeeded,
    /// The service failed to produce a review.
    Error,
}

impl ReviewStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dispatched => "Dispatched",
            Self::Succeeded => "Succeeded",
            Self::Error => "Error",
        }
    }
}

/// Response to a fetch-comments poll.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentsStatus {
    /// Current processing state.
    pub status: ReviewStatus,
    /// Failure detail when `status` is [`ReviewStatus::Error`].
    #[serde(default)]
    pub error: Option<String>,
    /// Service hint for how long to wait before polling again.
    #[serde(default)]
    pub wait_in_seconds: u64,
    /// Whether comments were written to the pull request.
    #[serde(default)]
    pub comments_created: bool,
}
