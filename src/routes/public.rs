use crate::{AppState, ApiDoc, handlers};
use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

/// Public Router Module
///
/// Endpoints reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /auth/callback?token=...
        // Identity provider hand-off: stores the user and sets the session cookie.
        .route("/auth/callback", get(handlers::auth_callback))
        // GET /auth/logout
        .route("/auth/logout", get(handlers::logout))
        // GET /api-docs/openapi.json
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
