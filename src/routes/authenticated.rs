use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here sits behind `auth::require_auth`: without a session the visitor is
/// redirected to the login page before any handler runs. Per-recipe ownership and
/// visibility checks happen in the handlers through `crate::policy`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /dashboard
        // The session user's own recipes, public and private.
        .route("/dashboard", get(handlers::dashboard))
        // GET /recipes/add
        .route("/recipes/add", get(handlers::add_recipe_form))
        // GET/POST /recipes
        // Public feed (newest first) and creation from the add form.
        .route(
            "/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        // GET/PUT/DELETE /recipes/{id}
        // PUT and DELETE also arrive as POST + `_method`, rewritten by `method_override`.
        .route(
            "/recipes/{id}",
            get(handlers::show_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        // GET /recipes/edit/{id}
        .route("/recipes/edit/{id}", get(handlers::edit_recipe_form))
        // GET /recipes/user/{user_id}
        .route("/recipes/user/{user_id}", get(handlers::user_recipes))
        // GET /recipes/search/{query}
        .route("/recipes/search/{query}", get(handlers::search_recipes))
}
