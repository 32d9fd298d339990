//! Bodies of the fallback reviews posted when no AI review arrives.

use super::policy::PollingPolicy;

/// Body posted when the review service reports a failure.
#[must_use]
pub fn error_review_body(details: &str) -> String {
    format!("Error while using the AI code reviewer. \nError details:{details}")
}

/// Body posted when the polling budget runs out.
#[must_use]
pub fn timeout_review_body(policy: &PollingPolicy) -> String {
    let minutes = policy.timeout_minutes();
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("AI code reviewer request timed out after {minutes} {unit}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{error_review_body, timeout_review_body};
    use crate::review::PollingPolicy;

    #[test]
    fn error_body_carries_service_detail() {
        assert_eq!(
            error_review_body("model overloaded"),
            "Error while using the AI code reviewer. \nError details:model overloaded"
        );
    }

    #[test]
    fn timeout_body_reports_policy_minutes() {
        assert_eq!(
            timeout_review_body(&PollingPolicy::default()),
            "AI code reviewer request timed out after 10 minutes"
        );
        assert_eq!(
            timeout_review_body(&PollingPolicy::default().with_max_attempts(4)),
            "AI code reviewer request timed out after 2 minutes"
        );
        assert_eq!(
            timeout_review_body(
                &PollingPolicy::default()
                    .with_initial_delay(Duration::ZERO)
                    .with_poll_interval(Duration::from_millis(5))
            ),
            "AI code reviewer request timed out after 1 minute"
        );
    }
}
