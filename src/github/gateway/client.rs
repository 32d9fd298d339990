//! Authenticated Octocrab client for the pull request under review.

use http::Uri;
use octocrab::Octocrab;
use tracing::debug;

use crate::github::error::IntakeError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client that talks to the API host of `locator`,
/// which is `GITHUB_API_URL` on GitHub Enterprise runners.
///
/// Octocrab spawns its connection pool on the ambient runtime, so this must
/// run inside a Tokio runtime context.
///
/// # Errors
///
/// Returns `IntakeError::InvalidUrl` when the API base is not a valid URI
/// and `IntakeError::Api` when Octocrab rejects it or fails to build.
pub(super) fn client_for_pull_request(
    token: &PersonalAccessToken,
    locator: &PullRequestLocator,
) -> Result<Octocrab, IntakeError> {
    let api_base = locator.api_base();
    let base_uri = api_base
        .as_str()
        .parse::<Uri>()
        .map_err(|error| IntakeError::InvalidUrl(format!("{api_base}: {error}")))?;
    debug!(
        api_base = %api_base,
        repository = %locator.full_name(),
        "building GitHub client"
    );

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| IntakeError::Api {
            message: format!("GitHub API base {api_base} rejected: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build GitHub client", &error))
}
