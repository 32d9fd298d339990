//! Error types exposed by the review service client.

use thiserror::Error;

/// Errors surfaced while talking to the review service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewServiceError {
    /// The service refused or failed the submission request.
    #[error("review submission was rejected: {message}")]
    SubmissionRejected {
        /// Status or decoding detail.
        message: String,
    },

    /// A poll for review comments failed at the transport level.
    #[error("polling for review comments failed: {message}")]
    PollTransport {
        /// Status or decoding detail.
        message: String,
    },

    /// The client could not be configured.
    #[error("review service configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}
