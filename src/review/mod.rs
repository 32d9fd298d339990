//! Review service protocol: submission, polling, and fallback reviews.
//!
//! [`ReviewServiceClient`] talks to the remote service. A
//! [`SubmissionOrchestrator`] drives one change set from submission to a
//! [`SessionOutcome`] under a [`PollingPolicy`], renewing identity tokens
//! as they near expiry.

pub mod client;
pub mod error;
pub mod fallback;
pub mod model;
pub mod policy;
pub mod session;

pub use client::{ReviewService, ReviewServiceClient};
pub use error::ReviewServiceError;
pub use fallback::{error_review_body, timeout_review_body};
pub use model::{
    CommentsStatus, FileChange, ReviewRequest, ReviewStatus, ReviewSubmission, SubmissionReceipt,
};
pub use policy::PollingPolicy;
pub use session::{PollOutcome, SessionError, SessionOutcome, SubmissionOrchestrator};

#[cfg(test)]
pub use client::MockReviewService;
