// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Mock API route tests.
//!
//! These tests verify that:
//! 1. Pagination parameters are validated
//! 2. The refresh cookie carries the expected attributes
//! 3. Errors use the `{status, code, message}` body

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use pixpro::mock::{DEMO_EMAIL, DEMO_PASSWORD, REFRESH_COOKIE};
use tower::ServiceExt;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_pagination_rejects_page_zero() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(get("/images/public?page=0&limit=12"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_pagination_rejects_out_of_range_limit() {
    for uri in ["/images/public?limit=0", "/images/public?limit=101"] {
        let (app, _) = common::create_test_app();
        let response = app.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_pagination_defaults() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/images/public")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["limit"], 12);
    assert_eq!(body["data"]["total"], 30);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_login_sets_http_only_refresh_cookie() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = find_cookie(&set_cookie_headers(&response), REFRESH_COOKIE);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));

    let body = json_body(response).await;
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], DEMO_EMAIL);
    assert_eq!(body["user"]["displayName"], "Demo");
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/auth/login",
            serde_json::json!({ "email": DEMO_EMAIL, "password": "Nope12345" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_headers(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, format!("{REFRESH_COOKIE}=stale"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = find_cookie(&set_cookie_headers(&response), REFRESH_COOKIE);
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(post_json("/auth/refresh", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.refresh_calls(), 1);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let (app, _) = common::create_test_app();

    let response = app.clone().oneshot(get("/auth/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_register_status_codes() {
    let (app, state) = common::create_test_app();

    let created = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "name": "New User",
                "email": "new@example.com",
                "password": "Password1",
                "displayName": "Newbie"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(json_body(created).await["success"], true);

    let duplicate = app
        .oneshot(post_json(
            "/auth/register",
            serde_json::json!({
                "name": "New User",
                "email": "NEW@example.com",
                "password": "Password1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(duplicate).await["code"], "EMAIL_EXISTS");
    assert_eq!(state.user_count(), 4);
}
