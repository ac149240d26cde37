//! Integration tests for authentication rejection paths.
//!
//! Requests without a usable credential are rejected before any store
//! access happens, so these run against a lazily connected pool.

mod common;

use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use common::{assert_error_envelope, build_test_app};
use tower::ServiceExt;

async fn request_with_auth(uri: &str, auth: Option<&str>) -> axum::response::Response {
    let app = build_test_app();

    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }

    app.oneshot(builder.body(Body::empty()).expect("request construction"))
        .await
        .expect("request should complete")
}

#[tokio::test]
async fn missing_authorization_header_is_401() {
    let response = request_with_auth("/api/v1/users", None).await;
    assert_error_envelope(
        response,
        StatusCode::UNAUTHORIZED,
        "missing authorization header",
    )
    .await;
}

#[tokio::test]
async fn wrong_authorization_scheme_is_401() {
    let response = request_with_auth("/api/v1/users", Some("Bearer some-key")).await;
    assert_error_envelope(
        response,
        StatusCode::UNAUTHORIZED,
        "missing authorization header",
    )
    .await;
}

#[tokio::test]
async fn inventory_routes_reject_unauthenticated_callers() {
    for uri in [
        "/api/v1/inventory/items",
        "/api/v1/inventory/items/1",
        "/api/v1/inventory/search",
    ] {
        let response = request_with_auth(uri, None).await;
        assert_error_envelope(
            response,
            StatusCode::UNAUTHORIZED,
            "missing authorization header",
        )
        .await;
    }
}
