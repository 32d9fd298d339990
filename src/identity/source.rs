//! Issue-then-verify token acquisition used by the review session.

use async_trait::async_trait;
use tracing::{Level, debug, enabled};

use super::error::IdentityError;
use super::provider::IdentityTokenProvider;
use super::token::IdentityToken;
use super::validator::TokenValidator;

/// Source of verified identity tokens.
///
/// Each call yields a freshly issued token; the session calls it once before
/// submitting and again whenever the current token nears expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityTokenSource: Send + Sync {
    /// Issues and verifies a new token.
    async fn acquire(&self) -> Result<IdentityToken, IdentityError>;
}

/// Pairs an [`IdentityTokenProvider`] with a [`TokenValidator`].
#[derive(Debug, Clone)]
pub struct ValidatedTokenSource {
    provider: IdentityTokenProvider,
    validator: TokenValidator,
}

impl ValidatedTokenSource {
    /// Creates a source from its two halves.
    #[must_use]
    pub const fn new(provider: IdentityTokenProvider, validator: TokenValidator) -> Self {
        Self {
            provider,
            validator,
        }
    }
}

#[async_trait]
impl IdentityTokenSource for ValidatedTokenSource {
    async fn acquire(&self) -> Result<IdentityToken, IdentityError> {
        let issued = self.provider.issue().await?;
        let token = self.validator.validate(&issued.value).await?;

        if enabled!(Level::DEBUG) {
            let claims = serde_json::to_string_pretty(token.claims())
                .unwrap_or_else(|error| format!("<claims not printable: {error}>"));
            debug!(expires_at = %token.expires_at(), "verified identity token claims:\n{claims}");
        }

        Ok(token)
    }
}
