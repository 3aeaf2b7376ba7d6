//! Server-rendered pages.
//!
//! Each `Page` variant is one named view (`login`, `dashboard`, `recipes/index`, ...) together
//! with the data it shows. Every piece of user-supplied text goes through `escape`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use uuid::Uuid;

use crate::models::{Recipe, RecipeEntry, RecipeForm, RecipeStatus};

/// Length of the instruction excerpt shown on listing cards.
const EXCERPT_LEN: usize = 150;

#[derive(Debug, Clone)]
pub enum Page {
    Login {
        login_url: Option<String>,
    },
    Dashboard {
        name: String,
        recipes: Vec<Recipe>,
    },
    AddRecipe {
        form: RecipeForm,
        error: Option<String>,
    },
    RecipeIndex {
        heading: String,
        viewer: Uuid,
        recipes: Vec<RecipeEntry>,
    },
    ShowRecipe {
        viewer: Uuid,
        entry: RecipeEntry,
    },
    EditRecipe {
        id: Uuid,
        form: RecipeForm,
        error: Option<String>,
    },
    NotFound,
    ServerError,
}

impl Page {
    /// The view name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Page::Login { .. } => "login",
            Page::Dashboard { .. } => "dashboard",
            Page::AddRecipe { .. } => "recipes/add",
            Page::RecipeIndex { .. } => "recipes/index",
            Page::ShowRecipe { .. } => "recipes/show",
            Page::EditRecipe { .. } => "recipes/edit",
            Page::NotFound => "error/404",
            Page::ServerError => "error/500",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Page::AddRecipe { error: Some(_), .. } | Page::EditRecipe { error: Some(_), .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Page::NotFound => StatusCode::NOT_FOUND,
            Page::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Page::Login { login_url } => {
                let action = match login_url {
                    Some(url) => format!(
                        r#"<a href="{}" class="btn">Log In With Google</a>"#,
                        escape(url)
                    ),
                    None => r#"<p class="notice">Sign-in is not configured. Set LOGIN_URL to the identity provider's sign-in address.</p>"#
                        .to_string(),
                };
                login_layout(&format!(
                    r#"<div class="card"><h3>Recipes</h3><p>Create and share your recipes</p>
{action}</div>"#
                ))
            }
            Page::Dashboard { name, recipes } => layout("Dashboard", &dashboard(name, recipes)),
            Page::AddRecipe { form, error } => layout(
                "Add Recipe",
                &recipe_form("Add Recipe", "/recipes", None, form, error.as_deref()),
            ),
            Page::RecipeIndex {
                heading,
                viewer,
                recipes,
            } => layout("Recipes", &recipe_index(heading, *viewer, recipes)),
            Page::ShowRecipe { viewer, entry } => {
                layout(&entry.recipe.title, &show_recipe(*viewer, entry))
            }
            Page::EditRecipe { id, form, error } => layout(
                "Edit Recipe",
                &recipe_form(
                    "Edit Recipe",
                    &format!("/recipes/{id}"),
                    Some("PUT"),
                    form,
                    error.as_deref(),
                ),
            ),
            Page::NotFound => layout(
                "Not Found",
                r#"<h3>Oops! 404</h3><p>We couldn't find that page.</p><a href="/recipes">Back to recipes</a>"#,
            ),
            Page::ServerError => layout(
                "Server Error",
                r#"<h3>Uh oh! 500</h3><p>Something went wrong on our end.</p><a href="/dashboard">Back to dashboard</a>"#,
            ),
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status(), Html(self.render())).into_response()
    }
}

/// escape
///
/// HTML-escapes text for element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shortens `text` to at most `max` characters, cutting at a word boundary when possible.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end())
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} | Recipes</title>
</head>
<body>
<nav>
<a href="/dashboard">Dashboard</a>
<a href="/recipes">Public Recipes</a>
<a href="/recipes/add">Add Recipe</a>
<a href="/auth/logout">Logout</a>
</nav>
<main class="container">
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn login_layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Login | Recipes</title>
</head>
<body class="login">
<main class="container">
{body}
</main>
</body>
</html>
"#
    )
}

fn dashboard(name: &str, recipes: &[Recipe]) -> String {
    let mut html = format!("<h6>Dashboard</h6><h3>Welcome {}</h3>", escape(name));

    if recipes.is_empty() {
        html.push_str(r#"<p>You have not created any recipes</p>"#);
        return html;
    }

    html.push_str(
        "<p>Here are your recipes</p><table><thead><tr><th>Title</th><th>Date</th><th>Status</th><th></th></tr></thead><tbody>",
    );
    for recipe in recipes {
        let _ = write!(
            html,
            r#"<tr><td><a href="/recipes/{id}">{title}</a></td><td>{date}</td><td><span class="status">{status}</span></td>
<td><a href="/recipes/edit/{id}" class="btn">Edit</a>
<form action="/recipes/{id}" method="POST" class="inline"><input type="hidden" name="_method" value="DELETE"><button type="submit" class="btn red">Delete</button></form></td></tr>"#,
            id = recipe.id,
            title = escape(&recipe.title),
            date = format_date(&recipe.created_at),
            status = recipe.status.as_str(),
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn recipe_index(heading: &str, viewer: Uuid, recipes: &[RecipeEntry]) -> String {
    let mut html = format!(
        r#"<h3>{}</h3>
<form action="/recipes/search/query" method="GET" class="search"><input type="text" name="query" placeholder="Search by title"><button type="submit" class="btn">Search</button></form>
<div class="row">"#,
        escape(heading)
    );

    if recipes.is_empty() {
        html.push_str("<p>No recipes to display</p>");
    }

    for entry in recipes {
        let recipe = &entry.recipe;
        let edit = if recipe.is_owned_by(viewer) {
            format!(r#"<a href="/recipes/edit/{}" class="edit">Edit</a>"#, recipe.id)
        } else {
            String::new()
        };
        let _ = write!(
            html,
            r#"<div class="card">{edit}<span class="card-title">{title}</span><p>{excerpt}</p>
<div class="author">{avatar}<a href="/recipes/user/{user_id}">{author}</a></div>
<a href="/recipes/{id}" class="btn">Read More</a></div>"#,
            title = escape(&recipe.title),
            excerpt = escape(&truncate(&recipe.instructions, EXCERPT_LEN)),
            avatar = avatar(entry),
            user_id = recipe.user_id,
            author = escape(&entry.author_name),
            id = recipe.id,
        );
    }
    html.push_str("</div>");
    html
}

fn show_recipe(viewer: Uuid, entry: &RecipeEntry) -> String {
    let recipe = &entry.recipe;
    let edit = if recipe.is_owned_by(viewer) {
        format!(r#"<a href="/recipes/edit/{}" class="edit">Edit</a>"#, recipe.id)
    } else {
        String::new()
    };
    format!(
        r#"<div class="row"><div class="col main"><h3>{title} {edit}</h3>
<div class="card"><span class="date">{date}</span>
<h5>Ingredients</h5><div class="ingredients">{ingredients}</div>
<h5>Instructions</h5><div class="instructions">{instructions}</div></div></div>
<div class="col side"><div class="card center">{avatar}<span class="card-title">{author}</span>
<a href="/recipes/user/{user_id}">More From {first}</a></div></div></div>"#,
        title = escape(&recipe.title),
        date = format_date(&recipe.created_at),
        ingredients = escape(&recipe.ingredients),
        instructions = escape(&recipe.instructions),
        avatar = avatar(entry),
        author = escape(&entry.author_name),
        user_id = recipe.user_id,
        first = escape(entry.author_name.split_whitespace().next().unwrap_or("Author")),
    )
}

fn avatar(entry: &RecipeEntry) -> String {
    match &entry.author_image {
        Some(image) => format!(
            r#"<img src="{}" alt="" class="avatar">"#,
            escape(image)
        ),
        None => String::new(),
    }
}

fn recipe_form(
    heading: &str,
    action: &str,
    method_override: Option<&str>,
    form: &RecipeForm,
    error: Option<&str>,
) -> String {
    let override_field = method_override
        .map(|m| format!(r#"<input type="hidden" name="_method" value="{m}">"#))
        .unwrap_or_default();
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let selected = RecipeStatus::parse(&form.status).unwrap_or_default();
    let option = |status: RecipeStatus, label: &str| {
        let attr = if status == selected { " selected" } else { "" };
        format!(r#"<option value="{}"{attr}>{label}</option>"#, status.as_str())
    };

    format!(
        r#"<h3>{heading}</h3>{error}
<form action="{action}" method="POST">{override_field}
<div class="input-field"><label for="title">Title</label><input type="text" id="title" name="title" value="{title}"></div>
<div class="input-field"><label for="status">Status</label><select id="status" name="status">{public}{private}</select></div>
<div class="input-field"><label for="ingredients">Ingredients</label><textarea id="ingredients" name="ingredients">{ingredients}</textarea></div>
<div class="input-field"><label for="instructions">Instructions</label><textarea id="instructions" name="instructions">{instructions}</textarea></div>
<input type="submit" value="Save" class="btn">
<a href="/dashboard" class="btn orange">Cancel</a>
</form>"#,
        heading = escape(heading),
        action = escape(action),
        title = escape(&form.title),
        public = option(RecipeStatus::Public, "Public"),
        private = option(RecipeStatus::Private, "Private"),
        ingredients = escape(&form.ingredients),
        instructions = escape(&form.instructions),
    )
}
