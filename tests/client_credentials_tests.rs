//! Integration tests for client-credentials authentication.
//!
//! These tests drive a resource request through a token endpoint mock and
//! verify that the bearer token is acquired once and reused.

use azure_arm::auth::{ClientCredentialsAuthorizer, Credential};
use azure_arm::{ArmConfig, CloudEnvironment, ErrorKind, ResourceClient};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DISK_PATH: &str =
    "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Compute/disks/d1";

/// Creates a client whose tokens come from the mock server.
fn create_client(server: &MockServer) -> ResourceClient {
    let credential = Credential::parse("tenant-1/sub-1", "client-1/secret-1").unwrap();
    let authorizer = ClientCredentialsAuthorizer::new(&credential, CloudEnvironment::AzurePublic)
        .with_token_url(format!("{}/tenant-1/oauth2/token", server.uri()));
    let config = ArmConfig::builder()
        .base_endpoint(server.uri())
        .build()
        .unwrap();
    ResourceClient::new(
        config,
        Arc::new(authorizer),
        credential.subscription_id().cloned(),
    )
    .unwrap()
}

// === Integration Tests ===

#[tokio::test]
async fn test_token_is_acquired_once_for_many_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "issued-token",
            "expires_in": "3599"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DISK_PATH))
        .and(header("authorization", "Bearer issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "d1"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_client(&server);
    assert_eq!(client.subscription_id().unwrap().as_ref(), "sub-1");

    for _ in 0..3 {
        let disk: Value = client.get(DISK_PATH).await.unwrap();
        assert_eq!(disk["name"], "d1");
    }
}

#[tokio::test]
async fn test_rejected_credentials_are_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DISK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = client.get::<Value>(DISK_PATH).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert_eq!(error.status(), Some(401));
}

#[test]
fn test_account_without_subscription_yields_unscoped_client() {
    let client =
        ResourceClient::from_credentials(ArmConfig::default(), "tenant-1", "client-1/secret-1")
            .unwrap();
    assert!(client.subscription_id().is_none());
}
