//! GitHub pull request intake and review posting.
//!
//! This module wraps Octocrab to resolve the pull request a workflow run was
//! triggered for, load its diff, and post fallback reviews. Errors are mapped
//! into user-friendly variants so that callers can surface precise failures
//! without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod intake;
pub mod locator;
pub mod models;

pub use error::IntakeError;
pub use gateway::{OctocrabGateway, PullRequestGateway};
pub use intake::PullRequestIntake;
pub use locator::{
    DEFAULT_API_BASE, PersonalAccessToken, PullRequestLocator, PullRequestNumber, RepositoryName,
    RepositoryOwner,
};
pub use models::{ChangeSet, ChangedFile, PullRequestMetadata, ReviewDraft};

#[cfg(test)]
pub use gateway::MockPullRequestGateway;

#[cfg(test)]
mod tests;
