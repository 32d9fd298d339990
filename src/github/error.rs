//! Error types exposed by the GitHub intake layer.

use thiserror::Error;

/// Errors surfaced while reading the workflow context or calling GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// The workflow did not name the repository.
    #[error("repository is required (set GITHUB_REPOSITORY)")]
    MissingRepository,

    /// The repository was not in `owner/repo` form.
    #[error("repository must be in owner/repo form, got {value:?}")]
    InvalidRepository {
        /// Value that failed to parse.
        value: String,
    },

    /// The workflow did not name the triggering event.
    #[error("event name is required (set GITHUB_EVENT_NAME)")]
    MissingEventName,

    /// The workflow was not triggered by a pull request.
    #[error("unsupported event {event:?}; only pull_request events are reviewed")]
    UnsupportedEvent {
        /// Event name reported by the workflow.
        event: String,
    },

    /// The workflow did not provide the git ref.
    #[error("git ref is required (set GITHUB_REF)")]
    MissingGitRef,

    /// The git ref was not a pull request merge ref.
    #[error("git ref must match refs/pull/<number>/merge, got {value:?}")]
    InvalidGitRef {
        /// Value that failed to parse.
        value: String,
    },

    /// The provided URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}
