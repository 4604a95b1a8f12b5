//! End-to-end tests for `POST /mycopet-customer-update`.
//!
//! Every path must answer 200 with a JSON status body, and the number of
//! Shopify calls must match the path taken.

use axum::body::Body;
use axum::http::StatusCode;
use mycopet_core::RawField;
use mycopet_integration_tests::{TestRelay, json_body, update_request};
use mycopet_relay::routes::MAX_BODY_BYTES;
use serde_json::{Value, json};

/// Update payload for one text field whose serialised size is exactly `size`.
fn payload_of_size(size: usize) -> Value {
    let with_value = |value: String| {
        json!({
            "email": "owner@example.com",
            "metafields": [RawField::new("pet_bio", value)]
        })
    };
    let envelope = with_value(String::new()).to_string().len();
    with_value("a".repeat(size - envelope))
}

/// Variables of the `SetCustomerMetafields` call Shopify received.
async fn mutation_variables(relay: &TestRelay) -> Value {
    let requests = relay.shopify.received_requests().await.unwrap();
    requests
        .iter()
        .map(|request| serde_json::from_slice::<Value>(&request.body).unwrap())
        .find(|body| body["operationName"] == "SetCustomerMetafields")
        .unwrap()["variables"]
        .clone()
}

#[tokio::test]
async fn missing_email_is_skipped_without_upstream_calls() {
    let relay = TestRelay::start().await;

    let response = relay
        .post_update(&json!({"metafields": [{"key": "pet_name", "value": "Biscuit"}]}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "skipped": "missing email or metafields"})
    );
    assert_eq!(relay.upstream_calls().await, 0);
}

#[tokio::test]
async fn empty_metafields_is_skipped_without_upstream_calls() {
    let relay = TestRelay::start().await;

    let response = relay
        .post_update(&json!({"email": "owner@example.com", "metafields": []}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "skipped": "missing email or metafields"})
    );
    assert_eq!(relay.upstream_calls().await, 0);
}

#[tokio::test]
async fn json_null_body_is_skipped() {
    let relay = TestRelay::start().await;

    let response = relay.post_update(&json!(null)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "skipped": "missing email or metafields"})
    );
}

#[tokio::test]
async fn malformed_json_is_rejected_by_extractor() {
    let relay = TestRelay::start().await;

    let response = relay
        .send(update_request().body(Body::from("{not json")).unwrap())
        .await;

    assert!(response.status().is_client_error());
    assert_eq!(relay.upstream_calls().await, 0);
}

#[tokio::test]
async fn unknown_customer_is_skipped_without_mutation() {
    let relay = TestRelay::start().await;
    relay.mock_lookup(json!([]), 1).await;
    relay.mock_set_metafields(json!({}), 0).await;

    let response = relay
        .post_update(&json!({
            "email": "nobody@example.com",
            "metafields": [{"key": "favorite_toy", "value": "ball"}]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "skipped": "customer-not-found"})
    );
}

#[tokio::test]
async fn known_customer_gets_typed_metafields() {
    let relay = TestRelay::start().await;
    relay
        .mock_lookup(json!([{"node": {"id": "gid://shopify/Customer/1001"}}]), 1)
        .await;

    let upstream = json!({
        "data": {
            "metafieldsSet": {
                "metafields": [
                    {"namespace": "profile", "key": "pet_weight_kg", "type": "number_decimal", "value": "12.5"},
                    {"namespace": "profile", "key": "pet_date_of_birth", "type": "date", "value": "2020-03-15"},
                    {"namespace": "profile", "key": "favorite_toy", "type": "single_line_text_field", "value": "ball"}
                ],
                "userErrors": []
            }
        }
    });
    relay.mock_set_metafields(upstream.clone(), 1).await;

    let response = relay
        .post_update(&json!({
            "email": "owner@example.com",
            "metafields": [
                {"key": "pet_weight_kg", "value": "12,5"},
                {"key": "pet_date_of_birth", "value": "2020-03-15T10:00:00Z"},
                {"key": "favorite_toy", "value": "ball"}
            ]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"ok": true, "result": upstream}));

    // The mutation carried the coerced fields in submission order
    assert_eq!(
        mutation_variables(&relay).await,
        json!({
            "ownerId": "gid://shopify/Customer/1001",
            "metafields": [
                {"namespace": "profile", "key": "pet_weight_kg", "type": "number_decimal", "value": "12.5"},
                {"namespace": "profile", "key": "pet_date_of_birth", "type": "date", "value": "2020-03-15"},
                {"namespace": "profile", "key": "favorite_toy", "type": "single_line_text_field", "value": "ball"}
            ]
        })
    );
}

#[tokio::test]
async fn upstream_user_errors_pass_through() {
    let relay = TestRelay::start().await;
    relay
        .mock_lookup(json!([{"node": {"id": "gid://shopify/Customer/1001"}}]), 1)
        .await;

    let upstream = json!({
        "data": {
            "metafieldsSet": {
                "metafields": null,
                "userErrors": [{"field": ["metafields", "0", "key"], "message": "Key is too short"}]
            }
        }
    });
    relay.mock_set_metafields(upstream.clone(), 1).await;

    let response = relay
        .post_update(&json!({
            "email": "owner@example.com",
            "metafields": [{"key": "x", "value": "y"}]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"ok": true, "result": upstream}));
}

#[tokio::test]
async fn unparseable_date_is_reported_not_raised() {
    let relay = TestRelay::start().await;
    relay
        .mock_lookup(json!([{"node": {"id": "gid://shopify/Customer/1001"}}]), 1)
        .await;
    relay.mock_set_metafields(json!({}), 0).await;

    let response = relay
        .post_update(&json!({
            "email": "owner@example.com",
            "metafields": [{"key": "pet_date_of_birth", "value": "the day after tomorrow"}]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("invalid date"));
}

#[tokio::test]
async fn non_json_upstream_is_reported_not_raised() {
    let relay = TestRelay::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&relay.shopify)
        .await;

    let response = relay
        .post_update(&json!({
            "email": "owner@example.com",
            "metafields": [{"key": "favorite_toy", "value": "ball"}]
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Shopify error: JSON parse error"));
}

#[tokio::test]
async fn proxy_host_mismatch_is_rejected_without_upstream_calls() {
    let relay = TestRelay::start_with(Some("mycopet.myshopify.com")).await;

    let response = relay
        .send(
            update_request()
                .header("x-forwarded-host", "evil.example.net")
                .body(Body::from(
                    json!({
                        "email": "owner@example.com",
                        "metafields": [{"key": "favorite_toy", "value": "ball"}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "reason": "not-from-shopify-proxy"})
    );
    assert_eq!(relay.upstream_calls().await, 0);
}

#[tokio::test]
async fn proxy_host_match_is_case_insensitive() {
    let relay = TestRelay::start_with(Some("mycopet.myshopify.com")).await;
    relay.mock_lookup(json!([]), 1).await;

    let response = relay
        .send(
            update_request()
                .header("x-forwarded-host", "MyCoPet.MyShopify.com")
                .body(Body::from(
                    json!({
                        "email": "owner@example.com",
                        "metafields": [{"key": "favorite_toy", "value": "ball"}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;

    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "skipped": "customer-not-found"})
    );
}

#[tokio::test]
async fn responses_carry_request_id() {
    let relay = TestRelay::start().await;

    let response = relay
        .send(
            update_request()
                .header("x-request-id", "req-123")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}

#[tokio::test]
async fn body_over_limit_is_refused_without_upstream_calls() {
    let relay = TestRelay::start().await;

    let body = payload_of_size(MAX_BODY_BYTES + 1);
    let response = relay.post_update(&body).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(relay.upstream_calls().await, 0);
}

#[tokio::test]
async fn body_at_limit_is_accepted() {
    let relay = TestRelay::start().await;
    relay
        .mock_lookup(json!([{"node": {"id": "gid://shopify/Customer/1001"}}]), 1)
        .await;
    relay
        .mock_set_metafields(json!({"data": {"metafieldsSet": {"userErrors": []}}}), 1)
        .await;

    let body = payload_of_size(MAX_BODY_BYTES);
    assert_eq!(body.to_string().len(), MAX_BODY_BYTES);
    let response = relay.post_update(&body).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ok"], true);
    assert_eq!(relay.upstream_calls().await, 2);
}

#[tokio::test]
async fn every_submitted_entry_becomes_one_metafield() {
    let relay = TestRelay::start().await;
    relay
        .mock_lookup(json!([{"node": {"id": "gid://shopify/Customer/1001"}}]), 1)
        .await;
    relay
        .mock_set_metafields(json!({"data": {"metafieldsSet": {"userErrors": []}}}), 1)
        .await;

    let response = relay
        .post_update(&json!({
            "email": "owner@example.com",
            "metafields": [
                RawField::new("pet_name", "Biscuit"),
                {"key": 5, "value": "five"},
                "junk"
            ]
        }))
        .await;

    assert_eq!(json_body(response).await["ok"], true);
    assert_eq!(
        mutation_variables(&relay).await["metafields"],
        json!([
            {"namespace": "profile", "key": "pet_name", "type": "single_line_text_field", "value": "Biscuit"},
            {"namespace": "profile", "key": "5", "type": "single_line_text_field", "value": "five"},
            {"namespace": "profile", "key": "", "type": "single_line_text_field", "value": ""}
        ])
    );
}
