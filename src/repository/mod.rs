use crate::models::{NewUser, Recipe, RecipeDraft, RecipeEntry, User};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Any failure of the backing store. Handlers never inspect the variant; every
/// `RepoError` aborts the request with the server-error page.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// Persistence contract for users and recipes. Handlers only see this trait, so the
/// Postgres store and the in-memory store are interchangeable.
///
/// Visibility rules that are pure filters (public feed, search, by-author listing) are
/// applied here, in the query. Per-record rules (show, edit, update, delete) are decided by
/// `crate::policy` on the record returned by `find_recipe`.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` usable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    // Find-or-create on sign-in; refreshes the profile fields of an existing user.
    async fn upsert_user(&self, user: NewUser) -> RepoResult<User>;

    // --- Recipe Listings ---
    // All public recipes, newest first.
    async fn list_public(&self) -> RepoResult<Vec<RecipeEntry>>;
    // Public recipes of one author, newest first.
    async fn list_public_by_user(&self, user_id: Uuid) -> RepoResult<Vec<RecipeEntry>>;
    // Every recipe of the owner regardless of status, newest first (dashboard).
    async fn list_by_owner(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>>;
    // Public recipes whose title contains `term`, case-insensitive, newest first.
    // An empty term matches every public recipe.
    async fn search_public(&self, term: &str) -> RepoResult<Vec<RecipeEntry>>;

    // --- Single Recipe ---
    // No visibility check; the caller applies the access policy.
    async fn find_recipe(&self, id: Uuid) -> RepoResult<Option<RecipeEntry>>;
    async fn create_recipe(&self, owner: Uuid, draft: RecipeDraft) -> RepoResult<Recipe>;
    // Full replace of the editable fields. Never touches `user_id`.
    async fn replace_recipe(&self, id: Uuid, draft: RecipeDraft) -> RepoResult<Option<Recipe>>;
    // Returns true if a row was removed.
    async fn delete_recipe(&self, id: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// escape_like
///
/// Escapes `\`, `%` and `_` so a user-supplied term is matched literally by `LIKE`/`ILIKE`
/// (with the default `\` escape character).
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
