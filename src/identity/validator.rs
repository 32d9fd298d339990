//! Signature verification for pipeline identity tokens.
//!
//! Verification is a straight-line sequence: decode the header, pin the
//! algorithm family, fetch the published key set, resolve the key by its
//! identifier, verify the signature, and read the `exp` claim. The key set
//! is fetched on every call.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::error::IdentityError;
use super::token::IdentityToken;

/// Key set published by the GitHub Actions identity issuer.
pub const DEFAULT_JWKS_URL: &str = "https://token.actions.githubusercontent.com/.well-known/jwks";

/// Algorithms the identity issuer may sign with. Anything else, including
/// HMAC and `none`, is refused before a key is looked up.
const ACCEPTED_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Verifies identity tokens against a remote JWKS document.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    client: Client,
    jwks_url: Url,
}

impl TokenValidator {
    /// Creates a validator that resolves keys from `jwks_url`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::KeyResolution`] when the URL cannot be parsed.
    pub fn new(client: Client, jwks_url: &str) -> Result<Self, IdentityError> {
        let parsed = Url::parse(jwks_url).map_err(|error| IdentityError::KeyResolution {
            message: format!("key set URL {jwks_url} is invalid: {error}"),
        })?;

        Ok(Self {
            client,
            jwks_url: parsed,
        })
    }

    /// Verifies `token` and returns it with its claims and expiry.
    ///
    /// Claim validation (expiry, audience, not-before) is not performed; the
    /// caller decides what to do with the expiry.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::MalformedToken`] when the token cannot be parsed,
    ///   carries no key identifier, declares an algorithm outside the RSA
    ///   family, fails signature verification, or has no numeric `exp`.
    /// - [`IdentityError::KeyResolution`] when the key set cannot be fetched.
    /// - [`IdentityError::UnknownKey`] when the key identifier is not
    ///   published.
    pub async fn validate(&self, token: &str) -> Result<IdentityToken, IdentityError> {
        let header = jsonwebtoken::decode_header(token).map_err(malformed)?;
        let key_id = header.kid.ok_or_else(|| IdentityError::MalformedToken {
            message: "token header does not name a key id".to_owned(),
        })?;

        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(IdentityError::MalformedToken {
                message: format!("signing algorithm {:?} is not accepted", header.alg),
            });
        }

        let key_set = self.fetch_key_set().await?;
        let jwk = key_set
            .find(&key_id)
            .ok_or_else(|| IdentityError::UnknownKey {
                key_id: key_id.clone(),
            })?;
        let key = DecodingKey::from_jwk(jwk).map_err(|error| IdentityError::KeyResolution {
            message: format!("key {key_id} is unusable: {error}"),
        })?;

        let verified = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &key,
            &signature_only(header.alg),
        )
        .map_err(malformed)?;

        let expires_at = read_expiry(&verified.claims)?;
        debug!(key_id = %key_id, expires_at = %expires_at, "identity token verified");

        Ok(IdentityToken::new(
            token.to_owned(),
            expires_at,
            verified.claims,
        ))
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, IdentityError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|error| IdentityError::KeyResolution {
                message: format!("key set request failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            return Err(IdentityError::KeyResolution {
                message: format!("key set endpoint returned {}", response.status()),
            });
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|error| IdentityError::KeyResolution {
                message: format!("key set decoding failed: {error}"),
            })
    }
}

fn signature_only(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

fn read_expiry(claims: &Map<String, Value>) -> Result<DateTime<Utc>, IdentityError> {
    let seconds = claims
        .get("exp")
        .and_then(epoch_seconds)
        .ok_or_else(|| IdentityError::MalformedToken {
            message: "token has no numeric exp claim".to_owned(),
        })?;

    DateTime::from_timestamp(seconds, 0).ok_or_else(|| IdentityError::MalformedToken {
        message: format!("exp claim {seconds} is out of range"),
    })
}

fn epoch_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|seconds| seconds.is_finite()).map(whole_seconds))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "NumericDate may be fractional; sub-second precision is dropped"
)]
fn whole_seconds(seconds: f64) -> i64 {
    seconds.trunc() as i64
}

fn malformed(error: jsonwebtoken::errors::Error) -> IdentityError {
    IdentityError::MalformedToken {
        message: error.to_string(),
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
