//! Gateways for talking to pull requests through Octocrab.
//!
//! The trait keeps the pipeline testable with mocks while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod pull_request;

pub use pull_request::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::IntakeError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ChangedFile, PullRequestMetadata, ReviewDraft};

/// Gateway that can read a pull request's diff and post reviews on it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch the pull request metadata.
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, IntakeError>;

    /// Fetch the files changed between `base` and `head`.
    async fn compare_commits(
        &self,
        locator: &PullRequestLocator,
        base: &str,
        head: &str,
    ) -> Result<Vec<ChangedFile>, IntakeError>;

    /// Post a review on the pull request, returning its identifier.
    async fn create_review(
        &self,
        locator: &PullRequestLocator,
        draft: &ReviewDraft,
    ) -> Result<u64, IntakeError>;
}
