//! Exchanges pipeline credentials for short-lived identity tokens.

use std::fmt;

use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::error::IdentityError;
use super::token::IssuedToken;

/// Pipeline value naming the token request endpoint.
pub const REQUEST_URL_VARIABLE: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";

/// Pipeline value holding the credential presented to the endpoint.
pub const REQUEST_TOKEN_VARIABLE: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";

/// Credentials handed to the job by the hosting pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityCredentials {
    request_url: String,
    request_token: String,
}

impl IdentityCredentials {
    /// Validates that both credentials are present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingCredential`] naming the first value
    /// that is absent or blank.
    pub fn new(
        request_url: Option<String>,
        request_token: Option<String>,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            request_url: require(request_url, REQUEST_URL_VARIABLE)?,
            request_token: require(request_token, REQUEST_TOKEN_VARIABLE)?,
        })
    }

    /// Token request endpoint as supplied by the pipeline.
    #[must_use]
    pub const fn request_url(&self) -> &str {
        self.request_url.as_str()
    }
}

impl fmt::Debug for IdentityCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IdentityCredentials")
            .field("request_url", &self.request_url)
            .field("request_token", &"<redacted>")
            .finish()
    }
}

fn require(value: Option<String>, name: &'static str) -> Result<String, IdentityError> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or(IdentityError::MissingCredential { name })
}

/// Issues identity tokens scoped to a single audience.
#[derive(Clone)]
pub struct IdentityTokenProvider {
    client: Client,
    token_url: Url,
    request_token: String,
}

impl IdentityTokenProvider {
    /// Prepares a provider for `audience`.
    ///
    /// The audience is appended to the request URL as an `audience` query
    /// parameter, replacing any existing one. An empty audience leaves the
    /// URL untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidRequestUrl`] when the request URL from
    /// the credentials cannot be parsed.
    pub fn new(
        client: Client,
        credentials: IdentityCredentials,
        audience: &str,
    ) -> Result<Self, IdentityError> {
        let token_url = build_token_url(&credentials.request_url, audience)?;
        Ok(Self {
            client,
            token_url,
            request_token: credentials.request_token,
        })
    }

    /// Requests a fresh token.
    ///
    /// Each call performs one authenticated GET; nothing is cached, so
    /// calling again re-issues a new token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::IssuanceTransport`] when the request fails,
    /// the endpoint does not answer 200, or the body is not a token payload.
    pub async fn issue(&self) -> Result<IssuedToken, IdentityError> {
        let response = self
            .client
            .get(self.token_url.clone())
            .bearer_auth(&self.request_token)
            .send()
            .await
            .map_err(|error| IdentityError::IssuanceTransport {
                message: format!("token request failed: {error}"),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::IssuanceTransport {
                message: format!("token endpoint returned {status}"),
            });
        }

        let issued = response
            .json::<IssuedToken>()
            .await
            .map_err(|error| IdentityError::IssuanceTransport {
                message: format!("token response decoding failed: {error}"),
            })?;
        debug!(count = issued.count, "identity token issued");
        Ok(issued)
    }
}

impl fmt::Debug for IdentityTokenProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IdentityTokenProvider")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

fn build_token_url(request_url: &str, audience: &str) -> Result<Url, IdentityError> {
    let mut url = Url::parse(request_url).map_err(|error| IdentityError::InvalidRequestUrl {
        message: error.to_string(),
    })?;

    if audience.is_empty() {
        return Ok(url);
    }

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name.as_ref() != "audience")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("audience", audience);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{IdentityCredentials, IdentityTokenProvider, build_token_url};
    use crate::identity::IdentityError;

    fn credentials(request_url: &str) -> IdentityCredentials {
        IdentityCredentials::new(Some(request_url.to_owned()), Some("request-token".to_owned()))
            .expect("credentials should be accepted")
    }

    #[rstest]
    #[case::url_missing(None, Some("token"), "ACTIONS_ID_TOKEN_REQUEST_URL")]
    #[case::url_blank(Some("  "), Some("token"), "ACTIONS_ID_TOKEN_REQUEST_URL")]
    #[case::token_missing(Some("https://issuer.example"), None, "ACTIONS_ID_TOKEN_REQUEST_TOKEN")]
    #[case::both_missing(None, None, "ACTIONS_ID_TOKEN_REQUEST_URL")]
    fn missing_credentials_are_rejected(
        #[case] request_url: Option<&str>,
        #[case] request_token: Option<&str>,
        #[case] expected: &'static str,
    ) {
        let result = IdentityCredentials::new(
            request_url.map(ToOwned::to_owned),
            request_token.map(ToOwned::to_owned),
        );

        assert_eq!(
            result,
            Err(IdentityError::MissingCredential { name: expected })
        );
    }

    #[rstest]
    #[case::adds_audience(
        "https://issuer.example/token?api-version=2.0",
        "https://review.example",
        "https://issuer.example/token?api-version=2.0&audience=https%3A%2F%2Freview.example"
    )]
    #[case::replaces_audience(
        "https://issuer.example/token?audience=old",
        "new",
        "https://issuer.example/token?audience=new"
    )]
    #[case::empty_audience_keeps_url(
        "https://issuer.example/token?api-version=2.0",
        "",
        "https://issuer.example/token?api-version=2.0"
    )]
    fn token_url_carries_audience(
        #[case] request_url: &str,
        #[case] audience: &str,
        #[case] expected: &str,
    ) {
        let url = build_token_url(request_url, audience).expect("URL should build");

        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn unparseable_request_url_is_rejected() {
        let result = IdentityTokenProvider::new(
            reqwest::Client::new(),
            credentials("issuer.example/token"),
            "aud",
        );

        assert!(
            matches!(result, Err(IdentityError::InvalidRequestUrl { .. })),
            "expected InvalidRequestUrl"
        );
    }

    #[tokio::test]
    async fn issues_token_with_bearer_credential_and_audience() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("audience", "https://review.example"))
            .and(header("authorization", "Bearer request-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"value": "jwt", "count": 3})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = IdentityTokenProvider::new(
            reqwest::Client::new(),
            credentials(&format!("{}/token", server.uri())),
            "https://review.example",
        )
        .expect("provider should build");
        let issued = provider.issue().await.expect("token should be issued");

        assert_eq!(issued.value, "jwt");
        assert_eq!(issued.count, 3);
    }

    #[rstest]
    #[case::unauthorised(ResponseTemplate::new(401))]
    #[case::server_error(ResponseTemplate::new(503))]
    #[case::not_json(ResponseTemplate::new(200).set_body_string("not json"))]
    #[case::wrong_shape(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt"})))]
    #[tokio::test]
    async fn issuance_failures_map_to_transport_errors(#[case] response: ResponseTemplate) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .respond_with(response)
            .mount(&server)
            .await;

        let provider = IdentityTokenProvider::new(
            reqwest::Client::new(),
            credentials(&format!("{}/token", server.uri())),
            "aud",
        )
        .expect("provider should build");
        let error = provider.issue().await.expect_err("issuance should fail");

        assert!(
            matches!(error, IdentityError::IssuanceTransport { .. }),
            "expected IssuanceTransport, got {error:?}"
        );
    }
}
