//! Common test utilities
//!
//! Shared across the shopcore integration tests: a wiremock server that
//! already answers the OAuth endpoint, and a client pointed at it.

#![allow(dead_code)]

use serde_json::{json, Value};
use shopcore::ElasticpathClient;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-access-token";

/// Token response valid for an hour from now.
pub fn token_body() -> Value {
    json!({
        "access_token": TEST_TOKEN,
        "token_type": "Bearer",
        "identifier": "implicit",
        "expires_in": 3600,
        "expires": chrono::Utc::now().timestamp() + 3600,
    })
}

/// Starts a mock Elasticpath server with the token endpoint mounted.
pub async fn mock_elasticpath() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .mount(&server)
        .await;
    server
}

/// Client using the implicit grant against `server`.
pub fn client_for(server: &MockServer) -> ElasticpathClient {
    ElasticpathClient::with_http_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "test-client-id".to_string(),
        None,
    )
}

/// Product in Elasticpath wire format.
pub fn product_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "type": "product",
        "name": name,
        "description": format!("{} description", name),
        "meta": {
            "display_price": {"with_tax": {"amount": 50000, "currency": "RUB", "formatted": "500.00 ₽"}},
            "stock": {"level": 10, "availability": "in-stock"}
        },
        "relationships": {}
    })
}
