//! Relay configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults**: Built-in defaults matching the review service contract
//! 2. **Configuration file**: `.review-relay.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables**: `REVIEW_RELAY_*`
//! 4. **Command-line arguments**: `--api-endpoint`/`-e` and friends
//!
//! Values the hosting workflow already exports (`GITHUB_REPOSITORY`,
//! `GITHUB_REF`, `ACTIONS_ID_TOKEN_REQUEST_URL`, ...) are used as fallbacks
//! by the `resolve_*` methods when no layer provides them.
//!
//! # Configuration File
//!
//! ```toml
//! api_endpoint = "https://review.example.com"
//! max_poll_attempts = 30
//! poll_interval_seconds = 20
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::DEFAULT_API_BASE;
use crate::github::error::IntakeError;
use crate::identity::provider::{REQUEST_TOKEN_VARIABLE, REQUEST_URL_VARIABLE};
use crate::identity::{DEFAULT_JWKS_URL, IdentityCredentials, IdentityError};
use crate::review::{PollingPolicy, ReviewServiceError};

const PAT_VARIABLE: &str = "PAT";
const GITHUB_TOKEN_VARIABLE: &str = "GITHUB_TOKEN";
const REPOSITORY_VARIABLE: &str = "GITHUB_REPOSITORY";
const EVENT_NAME_VARIABLE: &str = "GITHUB_EVENT_NAME";
const GIT_REF_VARIABLE: &str = "GITHUB_REF";
const API_URL_VARIABLE: &str = "GITHUB_API_URL";
const DEBUG_MODE_VARIABLE: &str = "DebugMode";

const DEFAULT_INITIAL_DELAY_SECONDS: u64 = 20;
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;
const DEFAULT_RENEWAL_THRESHOLD_SECONDS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Relay configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use review_relay::RelayConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = RelayConfig::load().expect("failed to load configuration");
/// let endpoint = config.require_api_endpoint().expect("endpoint required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEW_RELAY",
    discovery(
        dotfile_name = ".review-relay.toml",
        config_file_name = "review-relay.toml",
        app_name = "review-relay"
    )
)]
pub struct RelayConfig {
    /// Base URL of the review service.
    ///
    /// Can be provided via:
    /// - CLI: `--api-endpoint <URL>` or `-e <URL>`
    /// - Environment: `REVIEW_RELAY_API_ENDPOINT`
    /// - Config file: `api_endpoint = "..."`
    #[ortho_config(cli_short = 'e')]
    pub api_endpoint: Option<String>,

    /// Audience requested for identity tokens; defaults to `api_endpoint`.
    #[ortho_config(cli_short = 'a')]
    pub audience: Option<String>,

    /// Personal access token for GitHub API calls.
    ///
    /// Falls back to `PAT`, then `GITHUB_TOKEN`.
    #[ortho_config(cli_short = 't')]
    pub github_token: Option<String>,

    /// GitHub REST API base URL; falls back to `GITHUB_API_URL`.
    #[ortho_config()]
    pub github_api_url: Option<String>,

    /// `owner/repo`; falls back to `GITHUB_REPOSITORY`.
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Triggering event; falls back to `GITHUB_EVENT_NAME`.
    #[ortho_config()]
    pub event_name: Option<String>,

    /// Pull request merge ref; falls back to `GITHUB_REF`.
    #[ortho_config()]
    pub git_ref: Option<String>,

    /// Identity token request URL; falls back to `ACTIONS_ID_TOKEN_REQUEST_URL`.
    #[ortho_config()]
    pub id_token_request_url: Option<String>,

    /// Identity token request credential; falls back to
    /// `ACTIONS_ID_TOKEN_REQUEST_TOKEN`.
    #[ortho_config()]
    pub id_token_request_token: Option<String>,

    /// Key set used to verify identity tokens.
    #[ortho_config()]
    pub jwks_url: String,

    /// Enables debug logging and JSONL telemetry.
    ///
    /// Can be provided via:
    /// - CLI: `--debug` / `-d`
    /// - Config file: `debug = true`
    /// - Environment: `DebugMode=true` (read by [`Self::debug_enabled`])
    ///
    /// `REVIEW_RELAY_DEBUG` is not supported because `ortho_config` does not
    /// load boolean values from the environment.
    #[ortho_config(cli_short = 'd')]
    pub debug: bool,

    /// Seconds to wait between submission and the first poll.
    #[ortho_config()]
    pub initial_delay_seconds: u64,

    /// Seconds to wait after each `Dispatched` answer.
    #[ortho_config()]
    pub poll_interval_seconds: u64,

    /// Maximum number of polls before giving up.
    #[ortho_config()]
    pub max_poll_attempts: u32,

    /// Minimum token validity, in seconds, required when a poll is sent.
    #[ortho_config()]
    pub renewal_threshold_seconds: u64,

    /// Timeout applied to every HTTP request made to the identity endpoint,
    /// the key set, and the review service.
    #[ortho_config()]
    pub http_timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_endpoint: None,
            audience: None,
            github_token: None,
            github_api_url: None,
            repository: None,
            event_name: None,
            git_ref: None,
            id_token_request_url: None,
            id_token_request_token: None,
            jwks_url: DEFAULT_JWKS_URL.to_owned(),
            debug: false,
            initial_delay_seconds: DEFAULT_INITIAL_DELAY_SECONDS,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            renewal_threshold_seconds: DEFAULT_RENEWAL_THRESHOLD_SECONDS,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }
}

impl RelayConfig {
    /// Returns the review service endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::Configuration`] when no endpoint is
    /// configured.
    pub fn require_api_endpoint(&self) -> Result<&str, ReviewServiceError> {
        self.api_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or_else(|| ReviewServiceError::Configuration {
                message: "review service endpoint is required (use --api-endpoint or -e)"
                    .to_owned(),
            })
    }

    /// Audience for identity tokens, defaulting to the service endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::Configuration`] when neither an audience
    /// nor an endpoint is configured.
    pub fn resolve_audience(&self) -> Result<String, ReviewServiceError> {
        non_blank(self.audience.as_deref()).map_or_else(
            || self.require_api_endpoint().map(ToOwned::to_owned),
            Ok,
        )
    }

    /// Resolves the GitHub token from configuration, `PAT`, or
    /// `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingToken`] when no source provides a value.
    pub fn resolve_github_token(&self) -> Result<String, IntakeError> {
        non_blank(self.github_token.as_deref())
            .or_else(|| env_value(PAT_VARIABLE))
            .or_else(|| env_value(GITHUB_TOKEN_VARIABLE))
            .ok_or(IntakeError::MissingToken)
    }

    /// Resolves `owner/repo` from configuration or `GITHUB_REPOSITORY`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingRepository`] when unset.
    pub fn resolve_repository(&self) -> Result<String, IntakeError> {
        non_blank(self.repository.as_deref())
            .or_else(|| env_value(REPOSITORY_VARIABLE))
            .ok_or(IntakeError::MissingRepository)
    }

    /// Resolves the triggering event from configuration or
    /// `GITHUB_EVENT_NAME`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingEventName`] when unset.
    pub fn resolve_event_name(&self) -> Result<String, IntakeError> {
        non_blank(self.event_name.as_deref())
            .or_else(|| env_value(EVENT_NAME_VARIABLE))
            .ok_or(IntakeError::MissingEventName)
    }

    /// Resolves the git ref from configuration or `GITHUB_REF`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingGitRef`] when unset.
    pub fn resolve_git_ref(&self) -> Result<String, IntakeError> {
        non_blank(self.git_ref.as_deref())
            .or_else(|| env_value(GIT_REF_VARIABLE))
            .ok_or(IntakeError::MissingGitRef)
    }

    /// Resolves the GitHub API base from configuration, `GITHUB_API_URL`, or
    /// the public API.
    #[must_use]
    pub fn resolve_github_api_url(&self) -> String {
        non_blank(self.github_api_url.as_deref())
            .or_else(|| env_value(API_URL_VARIABLE))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned())
    }

    /// Collects identity token credentials from configuration or the
    /// pipeline's `ACTIONS_ID_TOKEN_REQUEST_*` values.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingCredential`] naming the first missing
    /// value.
    pub fn identity_credentials(&self) -> Result<IdentityCredentials, IdentityError> {
        IdentityCredentials::new(
            non_blank(self.id_token_request_url.as_deref())
                .or_else(|| env_value(REQUEST_URL_VARIABLE)),
            non_blank(self.id_token_request_token.as_deref())
                .or_else(|| env_value(REQUEST_TOKEN_VARIABLE)),
        )
    }

    /// Returns true when `debug` is set or `DebugMode` parses as true.
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        self.debug || env_value(DEBUG_MODE_VARIABLE).is_some_and(|value| parse_flag(&value))
    }

    /// Builds the polling policy from the timing fields.
    #[must_use]
    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy::default()
            .with_initial_delay(Duration::from_secs(self.initial_delay_seconds))
            .with_poll_interval(Duration::from_secs(self.poll_interval_seconds))
            .with_max_attempts(self.max_poll_attempts)
            .with_renewal_threshold(Duration::from_secs(self.renewal_threshold_seconds))
    }

    /// Timeout applied to outbound HTTP requests.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToOwned::to_owned)
}

fn env_value(name: &str) -> Option<String> {
    non_blank(env::var(name).ok().as_deref())
}

/// True only for `1`, `t`, `T`, `true`, `TRUE`, or `True`. Other spellings
/// such as `yes` or `on` are false.
fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}

#[cfg(test)]
mod tests;
