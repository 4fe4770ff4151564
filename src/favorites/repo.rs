use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::PgStore,
    recipes::{repo::RECIPE_COLUMNS, repo_types::RecipeRow, Recipe},
};

#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    /// Idempotent: favoriting twice leaves a single row.
    async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<()>;
    async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool>;
    async fn exists(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool>;
    /// Flips the favorite and returns the new state.
    async fn toggle(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool>;
    /// Favorited recipes, most recently favorited first.
    async fn list_recipes(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>>;
}

#[async_trait]
impl FavoriteRepo for PgStore {
    async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn exists(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.db)
        .await?;
        Ok(found)
    }

    async fn toggle(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let now_favorite: bool = sqlx::query_scalar("SELECT toggle_favorite($1, $2)")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(&self.db)
            .await?;
        Ok(now_favorite)
    }

    async fn list_recipes(&self, user_id: Uuid) -> anyhow::Result<Vec<Recipe>> {
        let columns = RECIPE_COLUMNS
            .split(", ")
            .map(|c| format!("r.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            SELECT {columns}
              FROM favorites f
              JOIN recipes r ON r.id = f.recipe_id
             WHERE f.user_id = $1
             ORDER BY f.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Recipe::try_from).collect()
    }
}
