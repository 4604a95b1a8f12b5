//! Customer profile update endpoint.
//!
//! Called by the storefront (directly or through the Shopify app proxy)
//! after the pet-profile form is submitted. Always answers `200` with a JSON
//! status body; see [`UpdateOutcome`] for the shapes.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::HOST},
    response::{IntoResponse, Response},
};
use mycopet_core::UpdateRequest;
use serde_json::Value;
use tracing::instrument;

use crate::services::profile::{UpdateOutcome, handle_update, host_matches};
use crate::state::AppState;

/// Header set by the Shopify app proxy (and most reverse proxies).
const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

impl IntoResponse for UpdateOutcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `POST /mycopet-customer-update`
///
/// Body: `{"email": "...", "metafields": [{"namespace"?, "key", "value"}]}`.
/// Bodies that are not valid JSON are rejected by the `Json` extractor
/// before this runs.
#[instrument(skip_all, fields(email))]
pub async fn update_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> UpdateOutcome {
    let request = UpdateRequest::from_json(body);
    if let Some(email) = request.email() {
        tracing::Span::current().record("email", email);
    }

    let from_proxy = state
        .config()
        .allowed_proxy_host
        .as_deref()
        .is_none_or(|allowed| host_matches(forwarded_host(&headers), allowed));

    handle_update(state.shopify(), &request, from_proxy).await
}

/// The host the request claims to have been forwarded for.
fn forwarded_host(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FORWARDED_HOST_HEADER)
        .or_else(|| headers.get(HOST))
        .and_then(|value| value.to_str().ok())
}
