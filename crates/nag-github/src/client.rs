//! GitHub API client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::types::PullRequestRef;

/// Placeholder repository name for search items without a repository URL.
const UNKNOWN_REPOSITORY: &str = "unknown";

/// Per-request timeout applied by the gateway.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub API client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Create a new GitHub client.
    ///
    /// # Errors
    /// Returns error if the token cannot be used as a header or the HTTP
    /// client fails to build.
    pub fn new(token: &AccessToken) -> Result<Self> {
        Self::with_base_url(token, Self::DEFAULT_API_URL)
    }

    /// Create a new GitHub client with a custom API URL (for GitHub Enterprise).
    ///
    /// # Errors
    /// Returns error if the token cannot be used as a header or the HTTP
    /// client fails to build.
    pub fn with_base_url(token: &AccessToken, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("nag-cli"));

        let mut auth = HeaderValue::from_str(&format!("token {}", token.expose()))
            .map_err(|_| Error::InvalidHeader)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Fetch the login of the token's owner.
    ///
    /// Any non-200 answer means the token is not usable.
    ///
    /// # Errors
    /// Returns error if the request fails or the token is rejected.
    pub async fn current_user(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct ApiUser {
            login: String,
        }

        let user: ApiUser = self.get("/user").await?;
        Ok(user.login)
    }

    /// Run an issue search and map every item to a [`PullRequestRef`].
    ///
    /// # Errors
    /// Returns error on transport failure, non-200 status, or an
    /// empty/undecodable body.
    pub async fn search_issues(&self, query: &str) -> Result<Vec<PullRequestRef>> {
        #[derive(serde::Deserialize)]
        struct Response {
            items: Vec<ApiIssue>,
        }

        #[derive(serde::Deserialize)]
        struct ApiIssue {
            id: u64,
            number: u64,
            title: String,
            html_url: String,
            updated_at: DateTime<Utc>,
            user: ApiUser,
            repository_url: Option<String>,
        }

        #[derive(serde::Deserialize)]
        struct ApiUser {
            login: String,
        }

        debug!(%query, "searching issues");
        let response: Response = self
            .get(&format!("/search/issues?q={}", urlencoding::encode(query)))
            .await?;
        debug!(%query, items = response.items.len(), "search returned");

        Ok(response
            .items
            .into_iter()
            .map(|item| PullRequestRef {
                id: item.id,
                number: item.number,
                title: item.title,
                repository: repository_from_url(item.repository_url.as_deref().unwrap_or_default()),
                author: item.user.login,
                url: item.html_url,
                updated_at: item.updated_at,
            })
            .collect())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

/// Extract `owner/name` from an API repository URL.
///
/// Takes everything after `/repos/`; falls back to `unknown`.
///
/// ```
/// use nag_github::repository_from_url;
///
/// assert_eq!(
///     repository_from_url("https://api.github.com/repos/octo/hello"),
///     "octo/hello"
/// );
/// assert_eq!(repository_from_url("https://api.github.com/users/octo"), "unknown");
/// ```
#[must_use]
pub fn repository_from_url(url: &str) -> String {
    url.split_once("/repos/")
        .map(|(_, rest)| rest.trim_end_matches('/'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(UNKNOWN_REPOSITORY)
        .to_string()
}

/// Require a 200 and decode the JSON body.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if status != StatusCode::OK {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    decode_body(&body)
}

/// Decode a JSON body, separating "nothing came back" from "wrong shape".
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::EmptyResponse);
    }

    serde_json::from_slice(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_from_url() {
        assert_eq!(
            repository_from_url("https://api.github.com/repos/rust-lang/rust"),
            "rust-lang/rust"
        );
        assert_eq!(
            repository_from_url("https://ghe.example.com/api/v3/repos/team/svc/"),
            "team/svc"
        );
        assert_eq!(repository_from_url(""), "unknown");
        assert_eq!(repository_from_url("https://api.github.com/repos/"), "unknown");
    }

    #[test]
    fn test_decode_body_distinguishes_empty_and_malformed() {
        #[derive(Debug, serde::Deserialize)]
        struct Shape {
            #[allow(dead_code)]
            login: String,
        }

        assert!(matches!(
            decode_body::<Shape>(b"  \n"),
            Err(Error::EmptyResponse)
        ));
        assert!(matches!(
            decode_body::<Shape>(br#"{"name":"x"}"#),
            Err(Error::MalformedResponse(_))
        ));
        assert!(decode_body::<Shape>(br#"{"login":"octo"}"#).is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = GitHubClient::new(&AccessToken::new("gho_secret")).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("gho_secret"));
    }
}
