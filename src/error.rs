//! Top-level error reported by a relay run.

use thiserror::Error;

use crate::github::IntakeError;
use crate::identity::IdentityError;
use crate::review::{ReviewServiceError, SessionError};

/// Any failure that aborts a run before a review outcome is reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Workflow context or GitHub API failure.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Identity token issuance or verification failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Review service failure.
    #[error(transparent)]
    Review(#[from] ReviewServiceError),

    /// Configuration could not be loaded or applied.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl From<SessionError> for RelayError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Identity(inner) => Self::Identity(inner),
            SessionError::Review(inner) => Self::Review(inner),
        }
    }
}
