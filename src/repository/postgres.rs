use super::{RepoResult, Repository, escape_like};
use crate::models::{NewUser, Recipe, RecipeDraft, RecipeEntry, RecipeStatus, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

const ENTRY_SELECT: &str = r#"
    SELECT
        r.id, r.user_id, r.title, r.ingredients, r.instructions, r.status, r.created_at,
        u.display_name AS author_name, u.image AS author_image
    FROM recipes r
    JOIN users u ON u.id = r.user_id
    WHERE 1 = 1
"#;

const RECIPE_COLUMNS: &str = "id, user_id, title, ingredients, instructions, status, created_at";

/// EntryFilter
///
/// The equality/pattern filters a listing query can combine.
#[derive(Default)]
struct EntryFilter<'a> {
    status: Option<RecipeStatus>,
    owner: Option<Uuid>,
    title: Option<&'a str>,
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// list_entries
    ///
    /// Builds the joined recipe/author listing with `QueryBuilder` so every filter value is
    /// bound, never interpolated.
    async fn list_entries(&self, filter: EntryFilter<'_>) -> RepoResult<Vec<RecipeEntry>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(ENTRY_SELECT);

        if let Some(status) = filter.status {
            builder.push(" AND r.status = ");
            builder.push_bind(status);
        }

        if let Some(owner) = filter.owner {
            builder.push(" AND r.user_id = ");
            builder.push_bind(owner);
        }

        if let Some(term) = filter.title {
            // Literal, case-insensitive substring match.
            builder.push(" AND r.title ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(term)));
        }

        builder.push(" ORDER BY r.created_at DESC, r.id DESC");

        let entries = builder
            .build_query_as::<RecipeEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, display_name, first_name, last_name, image, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// upsert_user
    ///
    /// `ON CONFLICT` keeps the original `created_at` and refreshes the profile fields.
    async fn upsert_user(&self, user: NewUser) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, first_name, last_name, image, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                image = EXCLUDED.image
            RETURNING id, display_name, first_name, last_name, image, created_at
            "#,
        )
        .bind(user.id)
        .bind(user.display_name)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.image)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_public(&self) -> RepoResult<Vec<RecipeEntry>> {
        self.list_entries(EntryFilter {
            status: Some(RecipeStatus::Public),
            ..EntryFilter::default()
        })
        .await
    }

    async fn list_public_by_user(&self, user_id: Uuid) -> RepoResult<Vec<RecipeEntry>> {
        self.list_entries(EntryFilter {
            status: Some(RecipeStatus::Public),
            owner: Some(user_id),
            ..EntryFilter::default()
        })
        .await
    }

    async fn list_by_owner(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipes)
    }

    async fn search_public(&self, term: &str) -> RepoResult<Vec<RecipeEntry>> {
        self.list_entries(EntryFilter {
            status: Some(RecipeStatus::Public),
            title: Some(term),
            ..EntryFilter::default()
        })
        .await
    }

    async fn find_recipe(&self, id: Uuid) -> RepoResult<Option<RecipeEntry>> {
        let entry = sqlx::query_as::<_, RecipeEntry>(&format!("{ENTRY_SELECT} AND r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// create_recipe
    ///
    /// The owner comes from the caller (the session user), never from the form.
    async fn create_recipe(&self, owner: Uuid, draft: RecipeDraft) -> RepoResult<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (id, user_id, title, ingredients, instructions, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(draft.title)
        .bind(draft.ingredients)
        .bind(draft.instructions)
        .bind(draft.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn replace_recipe(&self, id: Uuid, draft: RecipeDraft) -> RepoResult<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET title = $2, ingredients = $3, instructions = $4, status = $5
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(draft.title)
        .bind(draft.ingredients)
        .bind(draft.instructions)
        .bind(draft.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
