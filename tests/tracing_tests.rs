//! Request logging: spans carry the request path, never credentials from the query string.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use recipebook::{
    AppConfig, AppState, MemoryRepository,
    auth::{Claims, encode_session_token},
    create_app,
};
use std::sync::Arc;
use tower::ServiceExt;
use tracing_test::traced_test;
use uuid::Uuid;

fn test_state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config: AppConfig::default(),
    }
}

fn session_token(secret: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: Uuid::new_v4(),
        name: "Trace Tester".to_string(),
        given_name: None,
        family_name: None,
        picture: None,
        iat: now,
        exp: now + 3600,
    };
    encode_session_token(&claims, secret).unwrap()
}

#[traced_test]
#[tokio::test]
async fn callback_span_logs_path_without_session_token() {
    let state = test_state();
    let token = session_token(&state.config.session_secret);
    let app = create_app(state);

    let request = Request::builder()
        .uri(format!("/auth/callback?token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(logs_contain("path=/auth/callback"));
    assert!(logs_contain("session established"));
    assert!(!logs_contain(&token));
    assert!(!logs_contain("token="));
}

#[traced_test]
#[tokio::test]
async fn search_span_logs_path_only() {
    let app = create_app(test_state());

    let request = Request::builder()
        .uri("/recipes/search/query?query=pie")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(logs_contain("path=/recipes/search/query"));
    assert!(!logs_contain("query=pie"));
}
