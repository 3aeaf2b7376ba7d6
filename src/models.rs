use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Longest title accepted by the add/edit forms.
pub const MAX_TITLE_LEN: usize = 200;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The identity record mirrored from the external identity provider into the `users` table.
/// Created (or refreshed) on every successful sign-in hand-off.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    // Primary key, equal to the identity provider's subject.
    pub id: Uuid,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    // Avatar URL supplied by the identity provider.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// RecipeStatus
///
/// Visibility flag. Maps to the Postgres enum type `recipe_status`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "recipe_status", rename_all = "lowercase")]
pub enum RecipeStatus {
    #[default]
    Public,
    Private,
}

impl RecipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Public => "public",
            RecipeStatus::Private => "private",
        }
    }

    /// Parses the form value; anything other than the two variants is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(RecipeStatus::Public),
            "private" => Some(RecipeStatus::Private),
            _ => None,
        }
    }
}

/// Recipe
///
/// A recipe record from the `recipes` table. `user_id` is the owner, fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Recipe {
    pub id: Uuid,
    // FK to users.id (Owner).
    pub user_id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub status: RecipeStatus,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn is_public(&self) -> bool {
        self.status == RecipeStatus::Public
    }
}

/// RecipeEntry
///
/// A recipe joined with its author's public profile fields. Used by the listing pages
/// and the detail page, which show who wrote the recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct RecipeEntry {
    #[sqlx(flatten)]
    pub recipe: Recipe,
    pub author_name: String,
    pub author_image: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RecipeForm
///
/// The urlencoded body of the add and edit forms. Every field is kept as raw text so a bad
/// value can be shown back to the user instead of failing extraction. Unknown fields (an
/// injected `user`, the `_method` override) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct RecipeForm {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub status: String,
}

/// RecipeDraft
///
/// A validated `RecipeForm`, ready to be written by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub status: RecipeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please add a title")]
    MissingTitle,
    #[error("Title is too long ({len} characters, max {max})")]
    TitleTooLong { len: usize, max: usize },
    #[error("Status must be public or private")]
    InvalidStatus,
}

impl RecipeForm {
    /// validate
    ///
    /// Trims the title, checks its length and resolves the status. An empty status falls back
    /// to the default (`public`), matching a form submitted without the select.
    pub fn validate(&self) -> Result<RecipeDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong {
                len,
                max: MAX_TITLE_LEN,
            });
        }

        let status = if self.status.trim().is_empty() {
            RecipeStatus::default()
        } else {
            RecipeStatus::parse(&self.status).ok_or(ValidationError::InvalidStatus)?
        };

        Ok(RecipeDraft {
            title: title.to_string(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            status,
        })
    }
}

impl From<&Recipe> for RecipeForm {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            status: recipe.status.as_str().to_string(),
        }
    }
}

/// NewUser
///
/// Profile fields taken from the session token claims on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewUser {
    pub id: Uuid,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
}

/// SearchQuery
///
/// Query string of the search route. The search form submits the term as `?query=`.
#[derive(Debug, Clone, Deserialize, Default, utoipa::IntoParams)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// SessionHandoff
///
/// Query string of the identity provider callback.
#[derive(Debug, Clone, Deserialize, Default, utoipa::IntoParams)]
pub struct SessionHandoff {
    pub token: Option<String>,
}
