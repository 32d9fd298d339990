//! Review relay library crate.
//!
//! The relay runs inside a pull request workflow: it loads the pull request
//! diff from GitHub, submits it to a remote AI review service using a
//! short-lived pipeline identity token, and polls until the review is
//! produced. When the service fails or the polling budget runs out, a
//! fallback review is posted on the pull request instead.

pub mod annotations;
pub mod clock;
pub mod config;
pub mod error;
pub mod github;
pub mod identity;
pub mod logging;
pub mod pipeline;
pub mod review;
pub mod telemetry;

pub use config::RelayConfig;
pub use error::RelayError;
pub use github::{IntakeError, OctocrabGateway, PullRequestIntake, PullRequestLocator};
pub use identity::{IdentityError, IdentityTokenProvider, TokenValidator, ValidatedTokenSource};
pub use pipeline::{ReviewPipeline, RunOutcome, RunReport, run_from_config};
pub use review::{
    PollingPolicy, ReviewServiceClient, ReviewServiceError, SessionOutcome, SubmissionOrchestrator,
};
