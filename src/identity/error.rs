//! Error types raised while acquiring and verifying identity tokens.

use thiserror::Error;

/// Errors surfaced by the identity token exchange and validation flow.
///
/// Every variant is fatal for a review run: the session aborts as soon as a
/// token cannot be issued, verified, or renewed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// A credential supplied by the hosting pipeline was absent or blank.
    #[error("identity credential {name} is required")]
    MissingCredential {
        /// Name of the missing pipeline value.
        name: &'static str,
    },

    /// The token request URL could not be parsed.
    #[error("identity token request URL is invalid: {message}")]
    InvalidRequestUrl {
        /// Parser error detail.
        message: String,
    },

    /// The token endpoint failed or answered with an unusable body.
    #[error("identity token issuance failed: {message}")]
    IssuanceTransport {
        /// Transport, status, or decoding detail.
        message: String,
    },

    /// The signing key set could not be fetched or decoded.
    #[error("failed to resolve token signing keys: {message}")]
    KeyResolution {
        /// Transport, status, or decoding detail.
        message: String,
    },

    /// The token names a key that the fetched key set does not contain.
    #[error("no signing key matches key id {key_id}")]
    UnknownKey {
        /// Key identifier taken from the token header.
        key_id: String,
    },

    /// The token could not be parsed or its signature did not verify.
    #[error("identity token is malformed: {message}")]
    MalformedToken {
        /// Parse or verification detail.
        message: String,
    },

    /// A freshly issued token is already inside the renewal window.
    #[error(
        "renewed identity token is valid for {remaining_seconds}s, \
         below the {threshold_seconds}s renewal threshold"
    )]
    InsufficientValidity {
        /// Seconds of validity left on the renewed token.
        remaining_seconds: u64,
        /// Minimum validity required before a poll is sent.
        threshold_seconds: u64,
    },
}
