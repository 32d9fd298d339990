//! High-level intake facade used by the pipeline.

use tracing::{debug, info};

use super::error::IntakeError;
use super::gateway::PullRequestGateway;
use super::locator::PullRequestLocator;
use super::models::{ChangeSet, PullRequestMetadata};

/// Loads the change set of a pull request using a gateway.
pub struct PullRequestIntake<'client, Gateway>
where
    Gateway: PullRequestGateway + ?Sized,
{
    client: &'client Gateway,
}

impl<'client, Gateway> PullRequestIntake<'client, Gateway>
where
    Gateway: PullRequestGateway + ?Sized,
{
    /// Create a new intake facade using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self { client }
    }

    /// Load the author and the base and head commits of the target pull
    /// request.
    ///
    /// # Errors
    ///
    /// Propagates any failure from the underlying gateway, including GitHub
    /// authentication errors or network problems.
    pub async fn metadata(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, IntakeError> {
        let metadata = self.client.pull_request(locator).await?;
        debug!(
            pull_request = metadata.number,
            base = %metadata.base_sha,
            head = %metadata.head_sha,
            "loaded pull request metadata"
        );
        Ok(metadata)
    }

    /// Load the diff for already fetched pull request metadata.
    ///
    /// # Errors
    ///
    /// Propagates any failure from the comparison request.
    pub async fn change_set(
        &self,
        locator: &PullRequestLocator,
        metadata: PullRequestMetadata,
    ) -> Result<ChangeSet, IntakeError> {
        let files = self
            .client
            .compare_commits(locator, &metadata.base_sha, &metadata.head_sha)
            .await?;

        info!(
            pull_request = metadata.number,
            files = files.len(),
            "loaded pull request diff"
        );
        Ok(ChangeSet {
            locator: locator.clone(),
            author: metadata.author.unwrap_or_default(),
            files,
        })
    }
}
