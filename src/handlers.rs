use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    models::{RecipeForm, SearchQuery, SessionHandoff},
    policy::{self, Operation, Verdict},
    views::Page,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Where silent authorization denials are sent.
const RECIPES_PATH: &str = "/recipes";

/// A path id that does not parse cannot name a record; it is answered like a missing one.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

// --- Landing & Dashboard ---

/// login_page
///
/// [Guest Route] The landing page. Signed-in users never reach it: `guest_only` redirects
/// them to the dashboard.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Login page", content_type = "text/html", body = String),
        (status = 303, description = "Already signed in, redirect to /dashboard")
    )
)]
pub async fn login_page(State(state): State<AppState>) -> Page {
    Page::Login {
        login_url: state.config.login_url.clone(),
    }
}

/// dashboard
///
/// [Authenticated Route] Every recipe owned by the session user, private ones included.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", content_type = "text/html", body = String),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn dashboard(user: AuthUser, State(state): State<AppState>) -> Result<Page, AppError> {
    let recipes = state.repo.list_by_owner(user.id).await?;
    Ok(Page::Dashboard {
        name: user.first_name,
        recipes,
    })
}

// --- Recipe Creation ---

/// add_recipe_form
///
/// [Authenticated Route] Empty creation form.
#[utoipa::path(
    get,
    path = "/recipes/add",
    responses((status = 200, description = "Add form", content_type = "text/html", body = String))
)]
pub async fn add_recipe_form(_user: AuthUser) -> Page {
    Page::AddRecipe {
        form: RecipeForm::default(),
        error: None,
    }
}

/// create_recipe
///
/// [Authenticated Route] Processes the add form. The owner is always the session user; an
/// owner field in the submitted form is never read.
#[utoipa::path(
    post,
    path = "/recipes",
    request_body(content = RecipeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to /dashboard"),
        (status = 422, description = "Invalid form, re-rendered with the error", content_type = "text/html", body = String)
    )
)]
pub async fn create_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<RecipeForm>,
) -> Result<Response, AppError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => {
            return Ok(Page::AddRecipe {
                form,
                error: Some(e.to_string()),
            }
            .into_response());
        }
    };

    let recipe = state.repo.create_recipe(user.id, draft).await?;
    tracing::info!(recipe_id = %recipe.id, user_id = %user.id, "recipe created");
    Ok(Redirect::to(auth::DASHBOARD_PATH).into_response())
}

// --- Listings ---

/// list_recipes
///
/// [Authenticated Route] The public feed, newest first.
#[utoipa::path(
    get,
    path = "/recipes",
    responses((status = 200, description = "Public recipes", content_type = "text/html", body = String))
)]
pub async fn list_recipes(user: AuthUser, State(state): State<AppState>) -> Result<Page, AppError> {
    let recipes = state.repo.list_public().await?;
    Ok(Page::RecipeIndex {
        heading: "Recipes".to_string(),
        viewer: user.id,
        recipes,
    })
}

/// user_recipes
///
/// [Authenticated Route] Public recipes of one author.
#[utoipa::path(
    get,
    path = "/recipes/user/{user_id}",
    params(("user_id" = String, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author's public recipes", content_type = "text/html", body = String),
        (status = 404, description = "Malformed author id")
    )
)]
pub async fn user_recipes(
    user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Page, AppError> {
    let author = parse_id(&user_id)?;
    let recipes = state.repo.list_public_by_user(author).await?;
    let heading = recipes
        .first()
        .map(|entry| format!("Recipes by {}", entry.author_name))
        .unwrap_or_else(|| "Recipes".to_string());

    Ok(Page::RecipeIndex {
        heading,
        viewer: user.id,
        recipes,
    })
}

/// search_recipes
///
/// [Authenticated Route] Case-insensitive title search over public recipes, newest first.
///
/// The search form submits its input as `?query=`, which wins over the path segment. The
/// term is matched literally; an empty term matches every public recipe.
#[utoipa::path(
    get,
    path = "/recipes/search/{query}",
    params(("query" = String, Path, description = "Search term"), SearchQuery),
    responses((status = 200, description = "Matching public recipes", content_type = "text/html", body = String))
)]
pub async fn search_recipes(
    user: AuthUser,
    State(state): State<AppState>,
    Path(path_term): Path<String>,
    Query(params): Query<SearchQuery>,
) -> Result<Page, AppError> {
    let term = params.query.unwrap_or(path_term);
    let term = term.trim();
    let recipes = state.repo.search_public(term).await?;

    let heading = if term.is_empty() {
        "Recipes".to_string()
    } else {
        format!("Results for \"{term}\"")
    };
    Ok(Page::RecipeIndex {
        heading,
        viewer: user.id,
        recipes,
    })
}

// --- Single Recipe ---

/// show_recipe
///
/// [Authenticated Route] A public recipe, or a private one to its owner. A private recipe
/// requested by anyone else is answered exactly like a missing one.
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe page", content_type = "text/html", body = String),
        (status = 404, description = "Missing, or private and not yours", content_type = "text/html", body = String)
    )
)]
pub async fn show_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Page, AppError> {
    let entry = state.repo.find_recipe(parse_id(&id)?).await?;

    match policy::evaluate(entry.as_ref().map(|e| &e.recipe), user.id, Operation::View) {
        Verdict::Permit => Ok(Page::ShowRecipe {
            viewer: user.id,
            entry: entry.ok_or(AppError::NotFound)?,
        }),
        Verdict::NotFound | Verdict::Deny => Err(AppError::NotFound),
    }
}

/// edit_recipe_form
///
/// [Authenticated Route] Owner-only edit form. Non-owners are sent back to the public list.
#[utoipa::path(
    get,
    path = "/recipes/edit/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Edit form", content_type = "text/html", body = String),
        (status = 303, description = "Not the owner, redirect to /recipes"),
        (status = 404, description = "Missing recipe")
    )
)]
pub async fn edit_recipe_form(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let entry = state.repo.find_recipe(id).await?;

    match policy::evaluate(entry.as_ref().map(|e| &e.recipe), user.id, Operation::Edit) {
        Verdict::Permit => {
            let entry = entry.ok_or(AppError::NotFound)?;
            Ok(Page::EditRecipe {
                id,
                form: RecipeForm::from(&entry.recipe),
                error: None,
            }
            .into_response())
        }
        Verdict::Deny => Ok(Redirect::to(RECIPES_PATH).into_response()),
        Verdict::NotFound => Err(AppError::NotFound),
    }
}

/// update_recipe
///
/// [Authenticated Route] Owner-only full replace of title, ingredients, instructions and
/// status. Ownership itself is never changed.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body(content = RecipeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated (redirect to /dashboard) or not the owner (redirect to /recipes)"),
        (status = 404, description = "Missing recipe"),
        (status = 422, description = "Invalid form, re-rendered with the error", content_type = "text/html", body = String)
    )
)]
pub async fn update_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RecipeForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let entry = state.repo.find_recipe(id).await?;

    match policy::evaluate(entry.as_ref().map(|e| &e.recipe), user.id, Operation::Update) {
        Verdict::Permit => {}
        Verdict::Deny => {
            tracing::warn!(recipe_id = %id, user_id = %user.id, "update denied: not the owner");
            return Ok(Redirect::to(RECIPES_PATH).into_response());
        }
        Verdict::NotFound => return Err(AppError::NotFound),
    }

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => {
            return Ok(Page::EditRecipe {
                id,
                form,
                error: Some(e.to_string()),
            }
            .into_response());
        }
    };

    // Deleted between the lookup and the write.
    if state.repo.replace_recipe(id, draft).await?.is_none() {
        return Err(AppError::NotFound);
    }
    tracing::info!(recipe_id = %id, user_id = %user.id, "recipe updated");
    Ok(Redirect::to(auth::DASHBOARD_PATH).into_response())
}

/// delete_recipe
///
/// [Authenticated Route] Owner-only permanent removal.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 303, description = "Deleted (redirect to /dashboard) or not the owner (redirect to /recipes)"),
        (status = 404, description = "Missing recipe")
    )
)]
pub async fn delete_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let entry = state.repo.find_recipe(id).await?;

    match policy::evaluate(entry.as_ref().map(|e| &e.recipe), user.id, Operation::Delete) {
        Verdict::Permit => {
            state.repo.delete_recipe(id).await?;
            tracing::info!(recipe_id = %id, user_id = %user.id, "recipe deleted");
            Ok(Redirect::to(auth::DASHBOARD_PATH).into_response())
        }
        Verdict::Deny => {
            tracing::warn!(recipe_id = %id, user_id = %user.id, "delete denied: not the owner");
            Ok(Redirect::to(RECIPES_PATH).into_response())
        }
        Verdict::NotFound => Err(AppError::NotFound),
    }
}

// --- Session ---

/// auth_callback
///
/// [Public Route] Hand-off from the identity provider. A valid token creates or refreshes the
/// user record and becomes the session cookie; anything else goes back to the login page.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(SessionHandoff),
    responses((status = 303, description = "Signed in (redirect to /dashboard) or rejected (redirect to /)"))
)]
pub async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(handoff): Query<SessionHandoff>,
) -> Result<Response, AppError> {
    let Some(token) = handoff.token.filter(|t| !t.is_empty()) else {
        return Ok(Redirect::to(auth::LOGIN_PATH).into_response());
    };

    let claims = match auth::decode_session_token(&token, &state.config.session_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "identity provider hand-off rejected");
            return Ok(Redirect::to(auth::LOGIN_PATH).into_response());
        }
    };

    let user = state.repo.upsert_user(claims.to_new_user()).await?;
    tracing::info!(user_id = %user.id, "session established");

    let jar = jar.add(auth::session_cookie(&state.config, token));
    Ok((jar, Redirect::to(auth::DASHBOARD_PATH)).into_response())
}

/// logout
///
/// [Public Route] Drops the session cookie.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 303, description = "Signed out, redirect to /"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(auth::expired_session_cookie(&state.config));
    (jar, Redirect::to(auth::LOGIN_PATH))
}
