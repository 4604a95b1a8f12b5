//! CORS for the storefront origin.
//!
//! Only one origin is ever allowed: the configured shop origin, compared
//! exactly. Matching requests get permissive headers on every response.
//! Every `OPTIONS` request is answered here with `204 No Content`, and the
//! headers are only present when the origin matched.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Preflight cache lifetime in seconds (one day).
const MAX_AGE_SECS: &str = "86400";

/// Apply the single-origin CORS policy and short-circuit preflights.
pub async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allowed = state.config().cors_allowed_origin.as_str();

    let origin_allowed = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|origin| origin == allowed);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if origin_allowed {
        insert_cors_headers(response.headers_mut(), allowed);
    }

    response
}

fn insert_cors_headers(headers: &mut HeaderMap, origin: &str) {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!("CORS_ALLOWED_ORIGIN is not a valid header value");
        return;
    };

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST,OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}
