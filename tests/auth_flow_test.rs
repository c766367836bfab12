use httpmock::prelude::*;
use httpmock::Method::PATCH;
use pocketbase_kit::client::auth;
use pocketbase_kit::{handle, ClientConfig, KitError};
use serde_json::json;

// The client handle is process-wide, so the whole flow runs in one test.
#[tokio::test]
async fn test_auth_flow_through_global_handle() {
    assert!(matches!(
        auth::sign_in_with_email("a@b.c", "pw").await,
        Err(KitError::ConfigError { .. })
    ));

    let server = MockServer::start();
    let sign_up = server.mock(|when, then| {
        when.method(POST).path("/api/collections/users/records");
        then.status(200)
            .json_body(json!({"id": "u1", "email": "ada@example.com"}));
    });
    let bad_sign_in = server.mock(|when, then| {
        when.method(POST)
            .path("/api/collections/users/auth-with-password")
            .json_body(json!({"identity": "ada@example.com", "password": "wrong"}));
        then.status(400)
            .body(r#"{"code":400,"message":"Failed to authenticate.","data":{}}"#);
    });
    let sign_in = server.mock(|when, then| {
        when.method(POST)
            .path("/api/collections/users/auth-with-password")
            .json_body(json!({"identity": "ada@example.com", "password": "first-pass"}));
        then.status(200)
            .json_body(json!({"token": "user-token", "record": {"id": "u1"}}));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/collections/users/records/u1")
            .header("Authorization", "Bearer user-token");
        then.status(200).json_body(json!({"id": "u1"}));
    });
    let reset = server.mock(|when, then| {
        when.method(POST)
            .path("/api/collections/users/request-password-reset")
            .json_body(json!({"email": "ada@example.com"}));
        then.status(204);
    });

    let client = handle::init(ClientConfig::new(server.base_url())).unwrap();

    let created = auth::sign_up_with_email("ada@example.com", "first-pass", None)
        .await
        .unwrap();
    assert_eq!(created["id"], "u1");
    assert!(!client.is_signed_in());

    match auth::sign_in_with_email("ada@example.com", "wrong").await {
        Err(KitError::ApiError { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("Failed to authenticate."));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let payload = auth::sign_in_with_email("ada@example.com", "first-pass")
        .await
        .unwrap();
    assert_eq!(payload["token"], "user-token");
    assert_eq!(client.token().as_deref(), Some("user-token"));

    auth::update_password("first-pass", "second-pass").await.unwrap();
    auth::sign_out().unwrap();
    assert!(!client.is_signed_in());
    assert!(matches!(
        auth::update_password("second-pass", "third-pass").await,
        Err(KitError::AuthError { .. })
    ));

    auth::request_password_reset("ada@example.com").await.unwrap();

    sign_up.assert();
    bad_sign_in.assert();
    sign_in.assert();
    update.assert();
    reset.assert();
}
