//! Integration tests for the MycoPet profile relay.
//!
//! The relay router is driven in-process with `tower::ServiceExt::oneshot`
//! while Shopify is played by a `wiremock` server, so no credentials or
//! network access are needed.
//!
//! ```bash
//! cargo test -p mycopet-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{Router, body::Body, http::Request, response::Response};
use mycopet_relay::config::{DEFAULT_API_VERSION, RelayConfig, ShopifyConfig};
use mycopet_relay::routes;
use mycopet_relay::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Shop domain used by every test.
pub const SHOP: &str = "mycopet.myshopify.com";

/// Origin the relay allows for CORS in tests.
pub const SHOP_ORIGIN: &str = "https://mycopet.myshopify.com";

/// Admin GraphQL path for the default API version.
pub const GRAPHQL_PATH: &str = "/admin/api/2024-07/graphql.json";

/// Test harness: a mocked Shopify plus a relay router pointed at it.
pub struct TestRelay {
    pub shopify: MockServer,
    pub app: Router,
}

impl TestRelay {
    /// Start a mock Shopify and build a relay with the proxy check disabled.
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Start with an `ALLOWED_PROXY_HOST` value.
    pub async fn start_with(allowed_proxy_host: Option<&str>) -> Self {
        let shopify = MockServer::start().await;
        let config = test_config(&shopify.uri(), allowed_proxy_host);
        let app = routes::router(AppState::new(config).unwrap());
        Self { shopify, app }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// POST a JSON body to the update endpoint.
    pub async fn post_update(&self, body: &Value) -> Response {
        self.send(update_request().body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Mount a customer lookup answering with `edges`, expected `times` times.
    pub async fn mock_lookup(&self, edges: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(json!({"operationName": "FindCustomerByEmail"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"customers": {"edges": edges}}})),
            )
            .expect(times)
            .mount(&self.shopify)
            .await;
    }

    /// Mount a metafield write answering with `response`, expected `times` times.
    pub async fn mock_set_metafields(&self, response: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(json!({"operationName": "SetCustomerMetafields"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(times)
            .mount(&self.shopify)
            .await;
    }

    /// Number of requests Shopify received.
    pub async fn upstream_calls(&self) -> usize {
        self.shopify
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

/// Relay configuration pointing at `base_url`.
pub fn test_config(base_url: &str, allowed_proxy_host: Option<&str>) -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        shopify: ShopifyConfig {
            shop: SHOP.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_base_url: Url::parse(base_url).unwrap(),
            access_token: SecretString::from("shpat_integration_token"),
            timeout: Some(Duration::from_secs(5)),
        },
        cors_allowed_origin: SHOP_ORIGIN.to_string(),
        allowed_proxy_host: allowed_proxy_host.map(String::from),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Request builder for the update endpoint with a JSON content type.
pub fn update_request() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/mycopet-customer-update")
        .header("content-type", "application/json")
}

/// Read a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
