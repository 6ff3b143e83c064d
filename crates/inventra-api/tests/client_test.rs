#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use inventra_api::{ApiClient, Error, TokenCell};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, TokenCell::new())
        .with_retry(3, Duration::from_millis(5));
    (server, client)
}

fn ok_body(data: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "data": data })
}

fn product_json(id: &str, stock: u32) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Router",
        "sku": "RT-100",
        "category": "network",
        "stock": stock,
        "min_stock": 10,
        "unit_price": 129.0,
        "created_at": "2024-06-15T10:30:00Z",
        "updated_at": "2024-06-15T10:30:00Z"
    })
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({
            "token": "tok-abc",
            "user": { "id": "u1", "email": "a@b.com", "name": "Ada", "role": "admin" }
        }))))
        .mount(&server)
        .await;

    let secret = SecretString::from("x".to_string());
    let session = client.login("a@b.com", &secret).await.unwrap();

    assert_eq!(session.token, "tok-abc");
    assert_eq!(session.user.email, "a@b.com");
    assert_eq!(session.user.role, "admin");
}

#[tokio::test]
async fn test_login_failure_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("a@b.com", &secret).await;

    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

// ── Token handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_header_injected_when_token_set() {
    let (server, client) = setup().await;
    client.token().set(SecretString::from("tok-1".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_401_clears_token_and_later_calls_are_anonymous() {
    let (server, client) = setup().await;
    client.token().set(SecretString::from("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_products().await;
    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(!client.token().is_set(), "401 must clear the token");

    // The follow-up request must go out without an Authorization header.
    Mock::given(method("GET"))
        .and(path("/api/assets"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let assets = client.list_assets().await.unwrap();
    assert!(assets.is_empty());
}

#[tokio::test]
async fn test_403_does_not_touch_token() {
    let (server, client) = setup().await;
    client.token().set(SecretString::from("tok-1".to_string()));

    Mock::given(method("DELETE"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.delete_product("p1").await;
    assert!(matches!(result, Err(Error::Forbidden)));
    assert!(client.token().is_set(), "403 must not clear the token");
}

// ── Retry / backoff ─────────────────────────────────────────────────

#[tokio::test]
async fn test_429_retried_then_rate_limited() {
    let (server, client) = setup().await;

    // 1 initial attempt + 3 retries, all answered 429.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let result = client.list_products().await;

    match result {
        Err(Error::RateLimited { attempts }) => assert_eq!(attempts, 4),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_429_then_success_recovers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ok_body(json!([product_json("p1", 5)]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "p1");
}

#[tokio::test]
async fn test_network_failure_retried_then_surfaces() {
    // Nothing listening on this port; every attempt fails at connect.
    let base_url = Url::parse("http://127.0.0.1:9").unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, TokenCell::new())
        .with_retry(2, Duration::from_millis(5));

    let result = client.list_products().await;

    assert!(
        matches!(result, Err(Error::Network(_))),
        "expected Network error, got: {result:?}"
    );
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_message_parsed_from_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "success": false, "error": "database unavailable" })),
        )
        .mount(&server)
        .await;

    match client.list_products().await {
        Err(Error::Http { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("database unavailable"));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_success_false_with_200_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "duplicate sku" })),
        )
        .mount(&server)
        .await;

    let record: inventra_api::models::ProductRecord =
        serde_json::from_value(product_json("p1", 5)).unwrap();
    let result = client.create_product(&record).await;

    match result {
        Err(Error::Http { message, .. }) => assert!(message.contains("duplicate sku")),
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_data_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let result = client.list_products().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Probe ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_does_not_retry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.probe().await;
    assert!(matches!(result, Err(Error::RateLimited { .. })));
}

#[tokio::test]
async fn test_probe_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({ "status": "ok" }))))
        .mount(&server)
        .await;

    client.probe().await.unwrap();
}
