// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use judge_client::config::Config;
use judge_client::error::AppError;
use judge_client::services::BackendClient;
use serde_json::json;

#[test]
fn test_transient_errors() {
    assert!(AppError::Network("connection refused".to_string()).is_transient());
    assert!(AppError::Backend("HTTP 503".to_string()).is_transient());

    assert!(!AppError::AuthExpired.is_transient());
    assert!(!AppError::Validation("Name already taken".to_string()).is_transient());
    assert!(!AppError::NotFound("User not found".to_string()).is_transient());
    assert!(!AppError::Decode("missing field `uid`".to_string()).is_transient());
}

#[test]
fn test_sign_in_required() {
    assert!(AppError::AuthExpired.requires_sign_in());
    assert!(AppError::NotSignedIn.requires_sign_in());
    assert!(AppError::AuthExpired.is_auth_expired());

    assert!(!AppError::NotSignedIn.is_auth_expired());
    assert!(!AppError::Network("timeout".to_string()).requires_sign_in());
}

#[test]
fn test_validation_message_is_verbatim() {
    let err = AppError::Validation("Name must be between 1 and 50 characters".to_string());
    assert_eq!(err.to_string(), "Name must be between 1 and 50 characters");
    assert_eq!(
        AppError::AuthExpired.to_string(),
        "Session expired. Please login again."
    );
}

/// Backend whose `/api/problems` answers with `status` and `body`.
async fn backend_returning(status: StatusCode, body: serde_json::Value) -> BackendClient {
    let app = Router::new().route("/api/problems", get(move || async move { (status, Json(body)) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    BackendClient::new(&Config::for_api(format!("http://{}", addr))).unwrap()
}

#[tokio::test]
async fn test_status_classification() {
    let client = backend_returning(StatusCode::UNAUTHORIZED, json!({"error": "bad token"})).await;
    assert!(matches!(client.get_problems("t").await, Err(AppError::AuthExpired)));

    let client = backend_returning(StatusCode::BAD_REQUEST, json!({"error": "Name too long"})).await;
    match client.get_problems("t").await {
        Err(AppError::Validation(msg)) => assert_eq!(msg, "Name too long"),
        other => panic!("expected validation error, got {:?}", other),
    }

    // No message in the body: per-operation fallback text
    let client = backend_returning(StatusCode::FORBIDDEN, json!({})).await;
    match client.get_problems("t").await {
        Err(AppError::Validation(msg)) => assert_eq!(msg, "Failed to fetch problems"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let client = backend_returning(StatusCode::NOT_FOUND, json!({"error": "gone"})).await;
    assert!(matches!(client.get_problems("t").await, Err(AppError::NotFound(_))));

    let client = backend_returning(StatusCode::BAD_GATEWAY, json!({"error": "upstream"})).await;
    let err = client.get_problems("t").await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("502"));

    // Throttling and request timeouts are worth another attempt
    for status in [StatusCode::TOO_MANY_REQUESTS, StatusCode::REQUEST_TIMEOUT] {
        let client = backend_returning(status, json!({"error": "slow down"})).await;
        let err = client.get_problems("t").await.unwrap_err();
        assert!(err.is_transient(), "{} should be transient", status);
    }
}

#[tokio::test]
async fn test_schema_mismatch_is_decode_error() {
    // 200, but problems are missing required fields
    let client = backend_returning(StatusCode::OK, json!([{"title": "Two Sum"}])).await;
    assert!(matches!(client.get_problems("t").await, Err(AppError::Decode(_))));
}
