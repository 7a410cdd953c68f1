//! HTTP-level tests for the GitHub gateway against a mock server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use nag_github::{AccessToken, DeviceFlowClient, DeviceFlowError, Error, GitHubClient, TokenPoll};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REVIEW_QUERY: &str = "is:pr is:open review-requested:@me";

fn issue(id: u64, number: u64, repo: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "number": number,
        "title": format!("PR {number}"),
        "html_url": format!("https://github.com/{repo}/pull/{number}"),
        "updated_at": updated_at,
        "user": { "login": "octocat" },
        "repository_url": format!("https://api.github.com/repos/{repo}"),
        "state": "open"
    })
}

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_url(&AccessToken::new("gho_test"), server.uri()).unwrap()
}

#[tokio::test]
async fn search_issues_maps_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", REVIEW_QUERY))
        .and(header("authorization", "token gho_test"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [issue(101, 7, "octo/hello", "2025-01-02T03:04:05Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prs = client(&server).search_issues(REVIEW_QUERY).await.unwrap();

    assert_eq!(prs.len(), 1);
    let pr = &prs[0];
    assert_eq!(pr.id, 101);
    assert_eq!(pr.number, 7);
    assert_eq!(pr.title, "PR 7");
    assert_eq!(pr.repository, "octo/hello");
    assert_eq!(pr.author, "octocat");
    assert_eq!(pr.url, "https://github.com/octo/hello/pull/7");
    assert_eq!(pr.updated_at.to_rfc3339(), "2025-01-02T03:04:05+00:00");
}

#[tokio::test]
async fn search_issues_without_repository_url_uses_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": 1,
                "number": 2,
                "title": "orphan",
                "html_url": "https://github.com/x/y/pull/2",
                "updated_at": "2025-01-01T00:00:00Z",
                "user": { "login": "ghost" }
            }]
        })))
        .mount(&server)
        .await;

    let prs = client(&server).search_issues(REVIEW_QUERY).await.unwrap();
    assert_eq!(prs[0].repository, "unknown");
}

#[tokio::test]
async fn search_issues_non_200_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let err = client(&server).search_issues(REVIEW_QUERY).await.unwrap_err();
    assert!(err.is_unauthorized(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn search_issues_empty_body_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server).search_issues(REVIEW_QUERY).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse), "unexpected error: {err:?}");
}

#[tokio::test]
async fn search_issues_wrong_shape_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "hi" })))
        .mount(&server)
        .await;

    let err = client(&server).search_issues(REVIEW_QUERY).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn current_user_returns_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "token gho_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat", "id": 1 })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).current_user().await.unwrap(), "octocat");
}

#[tokio::test]
async fn current_user_rejects_any_non_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client(&server).current_user().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 204, .. }));
}

#[tokio::test]
async fn request_device_code_sends_client_id_and_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({ "client_id": "client-123", "scope": "read:user,repo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dev-code",
            "user_code": "ABCD-1234",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 899,
            "interval": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client-123", server.uri()).unwrap();
    let authorization = flow.request_device_code().await.unwrap();

    assert_eq!(authorization.device_code, "dev-code");
    assert_eq!(authorization.user_code, "ABCD-1234");
    assert_eq!(authorization.verification_uri, "https://github.com/login/device");
    assert_eq!(authorization.interval, 7);
    assert_eq!(authorization.expires_in, Some(899));
    assert!(!format!("{authorization:?}").contains("dev-code"));
}

#[tokio::test]
async fn request_device_code_defaults_interval() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dev",
            "user_code": "CODE",
            "verification_uri": "https://github.com/login/device"
        })))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    assert_eq!(flow.request_device_code().await.unwrap().interval, 5);
}

#[tokio::test]
async fn request_device_code_zero_interval_uses_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dev",
            "user_code": "CODE",
            "verification_uri": "https://github.com/login/device",
            "interval": 0
        })))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    assert_eq!(flow.request_device_code().await.unwrap().interval, 5);
}

#[tokio::test]
async fn request_device_code_missing_fields_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "device_code": "dev" })))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    let err = flow.request_device_code().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn request_token_reports_each_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_json(json!({
            "client_id": "client",
            "device_code": "pending-code",
            "grant_type": "urn:ietf:params:oauth:grant-type:device_code"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "authorization_pending" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_json(json!({
            "client_id": "client",
            "device_code": "denied-code",
            "grant_type": "urn:ietf:params:oauth:grant-type:device_code"
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "access_denied" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_json(json!({
            "client_id": "client",
            "device_code": "good-code",
            "grant_type": "urn:ietf:params:oauth:grant-type:device_code"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "gho_new",
            "token_type": "bearer",
            "scope": "read:user,repo"
        })))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();

    assert_eq!(flow.request_token("pending-code").await.unwrap(), TokenPoll::Pending);
    assert_eq!(
        flow.request_token("denied-code").await.unwrap(),
        TokenPoll::Denied(DeviceFlowError::AccessDenied)
    );
    assert_eq!(
        flow.request_token("good-code").await.unwrap(),
        TokenPoll::Granted(AccessToken::new("gho_new"))
    );
}

#[tokio::test]
async fn request_token_server_error_without_json_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    let err = flow.request_token("code").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 502, .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn request_token_server_error_with_empty_body_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    let err = flow.request_token("code").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 502, .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn request_token_empty_success_body_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let flow = DeviceFlowClient::with_base_url("client", server.uri()).unwrap();
    let err = flow.request_token("code").await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse), "unexpected error: {err:?}");
}
