//! Integration tests for the authorization-code grant against mock endpoints.

use chrono::Utc;
use serde_json::json;
use tunequiz_core::{
    Platform, ProviderConfig, Transition, oauth::AuthorizationFlow, oauth::OAuthError,
    refresh::HttpTokenRefresher, token_callback,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn provider(server: &MockServer, platform: Platform) -> ProviderConfig {
    let base = match platform {
        Platform::Youtube => ProviderConfig::youtube(),
        Platform::Spotify => ProviderConfig::spotify(),
    };
    base.with_auth_url(format!("{}/authorize", server.uri()))
        .with_token_url(format!("{}/token", server.uri()))
        .with_userinfo_url(format!("{}/me", server.uri()))
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "R1"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_code_exchange_issues_session() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "listener",
            "email": "listener@example.com",
            "display_name": "Listener"
        })))
        .mount(&mock_server)
        .await;

    let flow = AuthorizationFlow::new(
        provider(&mock_server, Platform::Spotify),
        "client-id",
        None,
        "http://localhost:3000/api/auth/callback/spotify",
    )
    .unwrap();

    let request = flow.authorize_url(&[]);
    assert!(request.url.starts_with(&mock_server.uri()));

    let grant = flow
        .exchange_code("auth-code", &request.pkce_verifier)
        .await
        .unwrap();
    assert_eq!(grant.user.id, "listener@example.com");
    assert_eq!(grant.provider_account_id, "listener");

    let refresher = HttpTokenRefresher::new(format!("{}/token", mock_server.uri()), "client-id", None);
    let outcome = token_callback(None, Some(grant), Utc::now(), &refresher).await;

    assert_eq!(outcome.transition, Transition::Issued);
    let record = outcome.record.unwrap();
    assert_eq!(record.access_token.expose(), "A1");
    assert!(record.refresh_token.is_some());
}

#[tokio::test]
async fn test_unverified_google_email_rejected() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1098",
            "email": "someone@example.com",
            "email_verified": false
        })))
        .mount(&mock_server)
        .await;

    let flow = AuthorizationFlow::new(
        provider(&mock_server, Platform::Youtube),
        "client-id",
        None,
        "http://localhost:3000/api/auth/callback/youtube",
    )
    .unwrap();

    let request = flow.authorize_url(&[]);
    let err = flow
        .exchange_code("auth-code", &request.pkce_verifier)
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::UnverifiedEmail { .. }));
}

#[tokio::test]
async fn test_rejected_code_is_exchange_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&mock_server)
        .await;

    let flow = AuthorizationFlow::new(
        provider(&mock_server, Platform::Spotify),
        "client-id",
        None,
        "http://localhost:3000/api/auth/callback/spotify",
    )
    .unwrap();

    let request = flow.authorize_url(&[]);
    let err = flow
        .exchange_code("bad-code", &request.pkce_verifier)
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::Exchange { .. }));
}
