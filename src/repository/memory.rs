use super::{RepoError, RepoResult, Repository};
use crate::models::{NewUser, Recipe, RecipeDraft, RecipeEntry, User};
use async_trait::async_trait;
use chrono::Utc;
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Newest first; equal timestamps fall back to descending id, as the Postgres queries do.
fn newest_first(a: &Recipe, b: &Recipe) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    recipes: HashMap<Uuid, Recipe>,
}

impl Store {
    fn entry(&self, recipe: &Recipe) -> RecipeEntry {
        let author = self.users.get(&recipe.user_id);
        RecipeEntry {
            recipe: recipe.clone(),
            author_name: author.map(|u| u.display_name.clone()).unwrap_or_default(),
            author_image: author.and_then(|u| u.image.clone()),
        }
    }

    /// Joined, newest-first listing of the recipes matching `keep`.
    fn entries<F>(&self, keep: F) -> Vec<RecipeEntry>
    where
        F: Fn(&Recipe) -> bool,
    {
        let mut entries: Vec<RecipeEntry> = self
            .recipes
            .values()
            .filter(|r| keep(r))
            .map(|r| self.entry(r))
            .collect();
        entries.sort_by(|a, b| newest_first(&a.recipe, &b.recipe));
        entries
    }
}

/// MemoryRepository
///
/// A `Repository` kept entirely in process memory. Used when no `DATABASE_URL` is configured
/// in local mode, and by the test suites. `new_failing` builds a store whose every call fails,
/// to exercise the server-error path.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Inserts a user directly, bypassing the sign-in flow.
    pub async fn seed_user(&self, user: User) {
        self.store.write().await.users.insert(user.id, user);
    }

    /// Inserts a recipe as-is, keeping its id, owner and timestamp.
    pub async fn seed_recipe(&self, recipe: Recipe) {
        self.store.write().await.recipes.insert(recipe.id, recipe);
    }

    pub async fn recipe_count(&self) -> usize {
        self.store.read().await.recipes.len()
    }

    fn check(&self) -> RepoResult<()> {
        if self.should_fail {
            return Err(RepoError::Unavailable(
                "memory store configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        self.check()?;
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: NewUser) -> RepoResult<User> {
        self.check()?;
        let mut store = self.store.write().await;
        let created_at = store
            .users
            .get(&user.id)
            .map(|existing| existing.created_at)
            .unwrap_or_else(Utc::now);
        let user = User {
            id: user.id,
            display_name: user.display_name,
            first_name: user.first_name,
            last_name: user.last_name,
            image: user.image,
            created_at,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_public(&self) -> RepoResult<Vec<RecipeEntry>> {
        self.check()?;
        Ok(self.store.read().await.entries(|r| r.is_public()))
    }

    async fn list_public_by_user(&self, user_id: Uuid) -> RepoResult<Vec<RecipeEntry>> {
        self.check()?;
        Ok(self
            .store
            .read()
            .await
            .entries(|r| r.is_public() && r.user_id == user_id))
    }

    async fn list_by_owner(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>> {
        self.check()?;
        let store = self.store.read().await;
        let mut recipes: Vec<Recipe> = store
            .recipes
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        recipes.sort_by(newest_first);
        Ok(recipes)
    }

    async fn search_public(&self, term: &str) -> RepoResult<Vec<RecipeEntry>> {
        self.check()?;
        let needle = term.to_lowercase();
        Ok(self
            .store
            .read()
            .await
            .entries(|r| r.is_public() && r.title.to_lowercase().contains(&needle)))
    }

    async fn find_recipe(&self, id: Uuid) -> RepoResult<Option<RecipeEntry>> {
        self.check()?;
        let store = self.store.read().await;
        Ok(store.recipes.get(&id).map(|r| store.entry(r)))
    }

    async fn create_recipe(&self, owner: Uuid, draft: RecipeDraft) -> RepoResult<Recipe> {
        self.check()?;
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: owner,
            title: draft.title,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            status: draft.status,
            created_at: Utc::now(),
        };
        self.store
            .write()
            .await
            .recipes
            .insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn replace_recipe(&self, id: Uuid, draft: RecipeDraft) -> RepoResult<Option<Recipe>> {
        self.check()?;
        let mut store = self.store.write().await;
        Ok(store.recipes.get_mut(&id).map(|recipe| {
            recipe.title = draft.title;
            recipe.ingredients = draft.ingredients;
            recipe.instructions = draft.instructions;
            recipe.status = draft.status;
            recipe.clone()
        }))
    }

    async fn delete_recipe(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(self.store.write().await.recipes.remove(&id).is_some())
    }
}
