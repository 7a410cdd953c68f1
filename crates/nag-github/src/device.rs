//! OAuth device authorization grant endpoints (RFC 8628).
//!
//! This module only speaks the wire protocol: one request per call. The
//! polling loop and its backoff live with the caller.

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::debug;

use crate::auth::AccessToken;
use crate::client::{REQUEST_TIMEOUT, decode_body};
use crate::error::{DeviceFlowError, Error, Result};
use crate::types::{DeviceAuthorization, TokenPoll};

/// Scopes requested for the token: profile lookup and private repo search.
const SCOPES: &str = "read:user,repo";

/// RFC 8628 grant type for device code exchange.
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Poll interval used when the server does not suggest one.
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Client for GitHub's device flow endpoints.
pub struct DeviceFlowClient {
    client: Client,
    base_url: String,
    client_id: String,
}

impl DeviceFlowClient {
    /// Default GitHub OAuth host.
    pub const DEFAULT_OAUTH_URL: &'static str = "https://github.com";

    /// Create a device flow client for an OAuth app.
    ///
    /// # Errors
    /// Returns error if the HTTP client fails to build.
    pub fn new(client_id: impl Into<String>) -> Result<Self> {
        Self::with_base_url(client_id, Self::DEFAULT_OAUTH_URL)
    }

    /// Create a device flow client against a custom OAuth host.
    ///
    /// # Errors
    /// Returns error if the HTTP client fails to build.
    pub fn with_base_url(client_id: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("nag-cli"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        })
    }

    /// Make a POST request and return the status and raw body.
    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, Vec<u8>)> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok((status, body))
    }

    /// Step one: obtain a device code and a user code.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status, or a body
    /// missing `device_code`, `user_code` or `verification_uri`.
    pub async fn request_device_code(&self) -> Result<DeviceAuthorization> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            scope: &'a str,
        }

        #[derive(serde::Deserialize)]
        struct Response {
            device_code: String,
            user_code: String,
            verification_uri: String,
            interval: Option<u64>,
            expires_in: Option<u64>,
        }

        let request = Request {
            client_id: &self.client_id,
            scope: SCOPES,
        };
        let (status, body) = self.post("/login/device/code", &request).await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let response: Response = decode_body(&body)?;
        debug!(
            interval = ?response.interval,
            expires_in = ?response.expires_in,
            "device code issued"
        );

        Ok(DeviceAuthorization {
            device_code: response.device_code,
            user_code: response.user_code,
            verification_uri: response.verification_uri,
            interval: poll_interval(response.interval),
            expires_in: response.expires_in,
        })
    }

    /// Step two: ask once whether the device code has been approved.
    ///
    /// # Errors
    /// Returns error on transport failure or when the body carries neither
    /// `access_token` nor `error`.
    pub async fn request_token(&self, device_code: &str) -> Result<TokenPoll> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            device_code: &'a str,
            grant_type: &'a str,
        }

        let request = Request {
            client_id: &self.client_id,
            device_code,
            grant_type: GRANT_TYPE,
        };
        let (status, body) = self.post("/login/oauth/access_token", &request).await?;

        // RFC 8628 servers may send `error` bodies with a 400, so the body
        // is inspected before the status.
        match parse_token_response(&body) {
            Err(Error::EmptyResponse | Error::MalformedResponse(_)) if !status.is_success() => {
                Err(Error::HttpStatus {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&body).into_owned(),
                })
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for DeviceFlowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceFlowClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Server-suggested interval, falling back to the default when absent or zero.
fn poll_interval(suggested: Option<u64>) -> u64 {
    suggested
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_INTERVAL_SECS)
}

/// Classify a token endpoint body.
fn parse_token_response(body: &[u8]) -> Result<TokenPoll> {
    #[derive(serde::Deserialize)]
    struct Response {
        access_token: Option<String>,
        error: Option<String>,
    }

    let response: Response = decode_body(body)?;

    match (response.access_token, response.error) {
        (Some(token), _) if !token.is_empty() => Ok(TokenPoll::Granted(AccessToken::new(token))),
        (_, Some(code)) => Ok(match code.as_str() {
            "authorization_pending" => TokenPoll::Pending,
            "slow_down" => TokenPoll::SlowDown,
            other => TokenPoll::Denied(DeviceFlowError::from_code(other)),
        }),
        _ => Err(Error::MalformedResponse(
            "token response has neither access_token nor error".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_granted() {
        let poll =
            parse_token_response(br#"{"access_token":"gho_abc","token_type":"bearer","scope":"repo"}"#)
                .unwrap();
        assert_eq!(poll, TokenPoll::Granted(AccessToken::new("gho_abc")));
    }

    #[test]
    fn test_parse_recoverable_states() {
        assert_eq!(
            parse_token_response(br#"{"error":"authorization_pending"}"#).unwrap(),
            TokenPoll::Pending
        );
        assert_eq!(
            parse_token_response(br#"{"error":"slow_down","interval":10}"#).unwrap(),
            TokenPoll::SlowDown
        );
    }

    #[test]
    fn test_parse_terminal_errors() {
        assert_eq!(
            parse_token_response(br#"{"error":"expired_token"}"#).unwrap(),
            TokenPoll::Denied(DeviceFlowError::ExpiredToken)
        );
        assert_eq!(
            parse_token_response(br#"{"error":"access_denied"}"#).unwrap(),
            TokenPoll::Denied(DeviceFlowError::AccessDenied)
        );
        assert_eq!(
            parse_token_response(br#"{"error":"device_flow_disabled"}"#).unwrap(),
            TokenPoll::Denied(DeviceFlowError::Other("device_flow_disabled".to_string()))
        );
    }

    #[test]
    fn test_poll_interval() {
        assert_eq!(poll_interval(Some(10)), 10);
        assert_eq!(poll_interval(Some(0)), DEFAULT_INTERVAL_SECS);
        assert_eq!(poll_interval(None), DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_token_response(br#"{"token_type":"bearer"}"#),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_token_response(b""),
            Err(Error::EmptyResponse)
        ));
        assert!(matches!(
            parse_token_response(b"<html>"),
            Err(Error::MalformedResponse(_))
        ));
    }
}
