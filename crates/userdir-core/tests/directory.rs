//! `me()` reads through the authorized client.

use userdir_core::api::DirectoryClient;
use userdir_core::auth::{now_millis, Credential, MemoryStore, Role, SessionManager, SessionStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_directory(server: &MockServer) -> DirectoryClient {
    let session = SessionManager::new(
        format!("{}/api", server.uri()),
        SessionStore::new(MemoryStore::new()),
    )
    .unwrap();
    session.set_current_credential(Some(Credential::new(
        "Bearer",
        "a_token",
        now_millis() + 300_000,
        Role::User,
    )));
    DirectoryClient::new(session)
}

#[tokio::test]
async fn me_returns_signed_in_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .and(header("authorization", "Bearer a_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "email": "ada@example.com",
            "name": "Ada",
            "picture": "https://example.com/ada.png",
            "last_seen_at": 1700000000,
            "password_updated_at": 1690000000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let directory = test_directory(&server);
    assert_eq!(directory.users_url(), format!("{}/api/users/", server.uri()));

    let user = directory.me().await.expect("user record");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.name, "Ada");
    assert_eq!(user.password, None);
}

#[tokio::test]
async fn me_with_invalid_payload_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Ada"})))
        .mount(&server)
        .await;

    assert!(test_directory(&server).me().await.is_none());
}

#[tokio::test]
async fn me_unauthorized_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(test_directory(&server).me().await.is_none());
}
