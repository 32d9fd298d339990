//! Octocrab implementation of the pull request gateway.

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::github::error::IntakeError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::{
    ApiComparison, ApiPullRequest, ApiReview, ChangedFile, PullRequestMetadata, ReviewDraft,
};

use super::PullRequestGateway;
use super::client::client_for_pull_request;
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and pull request locator.
    ///
    /// Must be called inside a Tokio runtime context.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URI cannot be parsed or
    /// `IntakeError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &PullRequestLocator,
    ) -> Result<Self, IntakeError> {
        let octocrab = client_for_pull_request(token, locator)?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, IntakeError> {
        self.client
            .get::<ApiPullRequest, _, _>(locator.pull_request_path(), None::<&()>)
            .await
            .map(ApiPullRequest::into)
            .map_err(|error| map_octocrab_error("pull request", &error))
    }

    async fn compare_commits(
        &self,
        locator: &PullRequestLocator,
        base: &str,
        head: &str,
    ) -> Result<Vec<ChangedFile>, IntakeError> {
        let comparison = self
            .client
            .get::<ApiComparison, _, _>(locator.compare_path(base, head), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("compare commits", &error))?;

        debug!(
            files = comparison.files.len(),
            base, head, "loaded commit comparison"
        );
        Ok(comparison.files.into_iter().map(ChangedFile::from).collect())
    }

    async fn create_review(
        &self,
        locator: &PullRequestLocator,
        draft: &ReviewDraft,
    ) -> Result<u64, IntakeError> {
        self.client
            .post::<_, ApiReview>(locator.reviews_path(), Some(draft))
            .await
            .map(|review| review.id)
            .map_err(|error| map_octocrab_error("create review", &error))
    }
}
