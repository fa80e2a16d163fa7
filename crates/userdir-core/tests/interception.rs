//! The Authorization header is stamped only on requests to the API root.

use userdir_core::auth::{now_millis, Credential, MemoryStore, Role, SessionManager, SessionStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_session(api_root: String) -> SessionManager {
    let session = SessionManager::new(api_root, SessionStore::new(MemoryStore::new())).unwrap();
    session.set_current_credential(Some(Credential::new(
        "test_type",
        "test_token",
        now_millis() + 300_000,
        Role::User,
    )));
    session
}

async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}

#[tokio::test]
async fn adds_authorization_on_calls_to_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/anything"))
        .and(header("authorization", "test_type test_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api_root = format!("{}/api/", server.uri());
    let client = live_session(api_root.clone()).client();
    let response = client
        .get(&format!("{}anything", api_root))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn never_adds_authorization_on_calls_to_other_sites() {
    let api = MockServer::start().await;
    let third_party = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&third_party)
        .await;

    let client = live_session(format!("{}/api/", api.uri())).client();
    client
        .get(&format!("{}/test/", third_party.uri()))
        .send()
        .await
        .unwrap();

    assert_eq!(authorization_headers(&third_party).await, vec![None]);
}

#[tokio::test]
async fn no_authorization_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api_root = format!("{}/api/", server.uri());
    let session = live_session(api_root.clone());
    session.logout(|| {});

    let client = session.client();
    client
        .get(&format!("{}users/", api_root))
        .send()
        .await
        .unwrap();

    assert_eq!(authorization_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn sessions_do_not_interfere() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api_root = format!("{}/api/", server.uri());
    let stamped = live_session(api_root.clone());
    let anonymous =
        SessionManager::new(api_root.clone(), SessionStore::new(MemoryStore::new())).unwrap();

    let url = format!("{}x", api_root);
    let client = anonymous.client();
    client.get(&url).send().await.unwrap();
    let client = stamped.client();
    client.get(&url).send().await.unwrap();

    assert_eq!(
        authorization_headers(&server).await,
        vec![None, Some("test_type test_token".to_string())]
    );
}

#[tokio::test]
async fn api_root_change_moves_stamping_target() {
    let old_api = MockServer::start().await;
    let new_api = MockServer::start().await;
    for server in [&old_api, &new_api] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    let session = live_session(format!("{}/api/", old_api.uri()));
    session.set_api_root(format!("{}/api/", new_api.uri()));
    assert!(session.is_authenticated());

    let client = session.client();
    client
        .get(&format!("{}/api/x", old_api.uri()))
        .send()
        .await
        .unwrap();
    client
        .get(&format!("{}/api/x", new_api.uri()))
        .send()
        .await
        .unwrap();

    assert_eq!(authorization_headers(&old_api).await, vec![None]);
    assert_eq!(
        authorization_headers(&new_api).await,
        vec![Some("test_type test_token".to_string())]
    );
}

#[tokio::test]
async fn post_with_body_is_stamped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/"))
        .and(header("authorization", "test_type test_token"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api_root = format!("{}/api/", server.uri());
    let client = live_session(api_root.clone()).client();
    let response = client
        .post(&format!("{}users/", api_root))
        .json(&serde_json::json!({"email": "test@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
}
