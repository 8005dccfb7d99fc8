use std::sync::Arc;

use portal_engine::{
    ApiClient, ApiError, ClientSettings, MemoryTokenStore, Method, TokenStore,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, tokens: Arc<dyn TokenStore>) -> ApiClient {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    ApiClient::new(settings, tokens).expect("client")
}

#[tokio::test]
async fn get_sends_bearer_and_accept_headers_when_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::with_token("secret-token")));
    let body: Value = client.get_json("/api/jobs/").await.expect("get ok");
    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn get_omits_authorization_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    for store in [MemoryTokenStore::new(), MemoryTokenStore::failing()] {
        let client = client_for(&server, Arc::new(store));
        let _: Value = client.get_json("/api/jobs/").await.expect("get ok");
    }

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert!(request.headers.get("authorization").is_none());
    }
}

#[tokio::test]
async fn token_changes_apply_to_the_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());
    let _: Value = client.get_json("/api/jobs/").await.expect("get ok");
    store.store("fresh").expect("store");
    let _: Value = client.get_json("/api/jobs/").await.expect("get ok");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1].headers.get("authorization").map(|v| v.to_str().unwrap().to_string()),
        Some("Bearer fresh".to_string())
    );
}

#[tokio::test]
async fn non_success_status_carries_status_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let err = client.get_json::<Value>("/api/jobs/").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            method: Method::Get,
            status: 503,
            url: "/api/jobs/".to_string(),
            body: Some("maintenance".to_string()),
        }
    );
    assert_eq!(err.to_string(), "GET /api/jobs/: 503");
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn post_serializes_json_body_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/run/"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer t0k"))
        .and(body_json(json!({"type": "full_load_demo"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "j1", "status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::with_token("t0k")));
    let ack: Value = client
        .post_json("/api/jobs/run/", &json!({"type": "full_load_demo"}))
        .await
        .expect("post ok");
    assert_eq!(ack["status"], "queued");
}

#[tokio::test]
async fn post_failure_reports_post_method() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/run/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let err = client
        .post_json::<_, Value>("/api/jobs/run/", &json!({"type": "x"}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "POST /api/jobs/run/: 403");
    assert_eq!(err.body(), None);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let err = client.get_json::<Value>("/api/jobs/").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789abcdef"))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        max_bytes: 8,
        ..ClientSettings::default()
    };
    let client = ApiClient::new(settings, Arc::new(MemoryTokenStore::new())).expect("client");
    let err = client.get_bytes("/big").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::TooLarge {
            method: Method::Get,
            url: "/big".to_string(),
            max_bytes: 8,
        }
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let settings = ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    };
    let result = ApiClient::new(settings, Arc::new(MemoryTokenStore::new()));
    assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
}
