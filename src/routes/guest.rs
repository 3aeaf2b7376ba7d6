use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Guest Router Module
///
/// The landing/login page. The router returned here must be wrapped in `auth::guest_only`
/// so signed-in users are redirected to their dashboard.
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        // GET /
        .route("/", get(handlers::login_page))
}
