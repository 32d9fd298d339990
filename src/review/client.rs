//! HTTP client for the remote review service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::ReviewServiceError;
use super::model::{CommentsStatus, ReviewRequest, ReviewSubmission, SubmissionReceipt};

const SUBMIT_PATH: &str = "codereview/submit";
const COMMENTS_PATH: &str = "codereview/comments";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Operations offered by the review service.
///
/// Neither operation is idempotent; callers submit once per run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Submits a change set for review.
    async fn submit(
        &self,
        bearer: &str,
        request: &ReviewRequest,
    ) -> Result<SubmissionReceipt, ReviewServiceError>;

    /// Fetches the processing state of a submitted review.
    async fn fetch_comments(
        &self,
        bearer: &str,
        submission: &ReviewSubmission,
    ) -> Result<CommentsStatus, ReviewServiceError>;
}

/// `reqwest`-backed review service client.
#[derive(Debug, Clone)]
pub struct ReviewServiceClient {
    client: Client,
    base_url: Url,
}

impl ReviewServiceClient {
    /// Creates a client for the service hosted at `api_endpoint`.
    ///
    /// Requests are sent below `<api_endpoint>/v1/app/`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::Configuration`] when the endpoint is not
    /// a valid base URL.
    pub fn new(client: Client, api_endpoint: &str) -> Result<Self, ReviewServiceError> {
        let base = format!("{}/v1/app/", api_endpoint.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|error| ReviewServiceError::Configuration {
            message: format!("review service endpoint {api_endpoint} is invalid: {error}"),
        })?;

        Ok(Self { client, base_url })
    }

    /// Base URL every request is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ReviewServiceError> {
        self.base_url
            .join(path)
            .map_err(|error| ReviewServiceError::Configuration {
                message: format!("cannot build {path} URL: {error}"),
            })
    }
}

#[async_trait]
impl ReviewService for ReviewServiceClient {
    async fn submit(
        &self,
        bearer: &str,
        request: &ReviewRequest,
    ) -> Result<SubmissionReceipt, ReviewServiceError> {
        let rejected = |message: String| ReviewServiceError::SubmissionRejected { message };
        let body = serde_json::to_vec(request)
            .map_err(|error| rejected(format!("request serialisation failed: {error}")))?;

        debug!(
            files = request.file_changes.len(),
            pull_number = request.pull_number,
            "submitting change set for review"
        );
        let response = self
            .client
            .post(self.endpoint(SUBMIT_PATH)?)
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|error| rejected(format!("request transport failed: {error}")))?;

        decode_ok(response).await.map_err(rejected)
    }

    async fn fetch_comments(
        &self,
        bearer: &str,
        submission: &ReviewSubmission,
    ) -> Result<CommentsStatus, ReviewServiceError> {
        let transport = |message: String| ReviewServiceError::PollTransport { message };

        let response = self
            .client
            .get(self.endpoint(COMMENTS_PATH)?)
            .bearer_auth(bearer)
            .query(&[
                ("fullreponame", submission.full_repo_name()),
                ("codereviewid", submission.review_id()),
            ])
            .send()
            .await
            .map_err(|error| transport(format!("request transport failed: {error}")))?;

        decode_ok(response).await.map_err(transport)
    }
}

/// Requires a 200 response and decodes its JSON body.
async fn decode_ok<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.map_or_else(
            |_| "(failed to read error response body)".to_owned(),
            |content| truncate_for_message(&content, 160),
        );
        return Err(format!("unexpected status code {}: {body}", status.as_u16()));
    }

    let text = response
        .text()
        .await
        .map_err(|error| format!("failed to read response body: {error}"))?;
    serde_json::from_str(&text).map_err(|error| format!("failed to decode JSON: {error}"))
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output: String = message.chars().take(max_chars).collect();
    if message.chars().nth(max_chars).is_some() {
        output.push_str("...");
    }
    output
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
