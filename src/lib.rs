use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod method_override;
pub mod models;
pub mod policy;
pub mod repository;
pub mod views;

// Routes grouped by access gate (public, guest-only, authenticated).
pub mod routes;
use routes::{authenticated, guest, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI description of every route, built from the `#[utoipa::path]` annotations and
/// served at `/api-docs/openapi.json`. Pages are documented as `text/html` bodies.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_page, handlers::dashboard, handlers::add_recipe_form,
        handlers::create_recipe, handlers::list_recipes, handlers::user_recipes,
        handlers::search_recipes, handlers::show_recipe, handlers::edit_recipe_form,
        handlers::update_recipe, handlers::delete_recipe, handlers::auth_callback,
        handlers::logout
    ),
    components(
        schemas(
            models::Recipe, models::RecipeStatus, models::RecipeEntry, models::RecipeForm,
            models::User,
        )
    ),
    tags(
        (name = "recipebook", description = "Recipe sharing web application")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, immutable container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres or in-memory store behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let the session extractor pull just the pieces it needs from the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the route groups with their access gates, the not-found fallback and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Public Routes: no gate.
        .merge(public::public_routes())
        // Guest Routes: signed-in users are redirected to the dashboard.
        .merge(
            guest::guest_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::guest_only,
            )),
        )
        // Authenticated Routes: visitors without a session are redirected to the login page.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_auth,
            )),
        )
        .fallback(|| async { views::Page::NotFound })
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Generates a unique UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // Wraps the request/response lifecycle in a span carrying the request id.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Returns the x-request-id header to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// create_app
///
/// The router wrapped so that `method_override` runs before routing: an empty outer router
/// whose fallback is the real one. This is the service to serve.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .fallback_service(create_router(state))
        .layer(middleware::from_fn(method_override::method_override))
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, path and the `x-request-id` set by `SetRequestIdLayer`.
/// The query string is left out: the sign-in hand-off carries the session token there.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
