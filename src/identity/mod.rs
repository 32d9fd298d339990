//! Pipeline identity tokens: issuance, verification, and acquisition.
//!
//! The hosting pipeline hands the job a request URL and a credential. The
//! [`IdentityTokenProvider`] exchanges them for a short-lived signed token,
//! the [`TokenValidator`] verifies its signature against the issuer's
//! published keys and reads its expiry, and [`ValidatedTokenSource`] chains
//! the two behind the [`IdentityTokenSource`] trait used by review sessions.

pub mod error;
pub mod provider;
pub mod source;
pub mod token;
pub mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::IdentityError;
pub use provider::{IdentityCredentials, IdentityTokenProvider};
pub use source::{IdentityTokenSource, ValidatedTokenSource};
pub use token::{IdentityToken, IssuedToken};
pub use validator::{DEFAULT_JWKS_URL, TokenValidator};

#[cfg(test)]
pub use source::MockIdentityTokenSource;
