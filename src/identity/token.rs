//! Identity token values produced by issuance and verification.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Token payload returned by the pipeline identity endpoint.
///
/// The expiry is not part of the payload; pass [`IssuedToken::value`] through
/// a [`TokenValidator`](super::TokenValidator) to obtain it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedToken {
    /// Signed bearer token.
    pub value: String,
    /// Issuance counter reported by the endpoint.
    #[serde(default)]
    pub count: u64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IssuedToken")
            .field("value", &"<redacted>")
            .field("count", &self.count)
            .finish()
    }
}

/// Bearer token whose signature has been verified and whose expiry is known.
///
/// Tokens are never mutated; renewal replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken {
    value: String,
    expires_at: DateTime<Utc>,
    claims: Map<String, Value>,
}

impl IdentityToken {
    /// Wraps a verified token.
    #[must_use]
    pub const fn new(value: String, expires_at: DateTime<Utc>, claims: Map<String, Value>) -> Self {
        Self {
            value,
            expires_at,
            claims,
        }
    }

    /// Bearer string to attach to outbound requests.
    #[must_use]
    pub const fn bearer(&self) -> &str {
        self.value.as_str()
    }

    /// Instant read from the `exp` claim.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Verified claim set.
    #[must_use]
    pub const fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Time left before expiry, saturating at zero for expired tokens.
    #[must_use]
    pub fn remaining_validity(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns true when the remaining validity is below `threshold`.
    #[must_use]
    pub fn needs_renewal(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.remaining_validity(now) < threshold
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IdentityToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("claims", &self.claims.len())
            .finish()
    }
}
