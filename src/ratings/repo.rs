use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::Rating;
use crate::db::PgStore;

const RATING_COLUMNS: &str = "id, user_id, recipe_id, rating, review, created_at, updated_at";

#[async_trait]
pub trait RatingRepo: Send + Sync {
    /// Inserts or replaces the user's rating for the recipe.
    async fn upsert(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        rating: i32,
        review: Option<&str>,
    ) -> anyhow::Result<Rating>;
    async fn get(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<Option<Rating>>;
    /// Newest first.
    async fn list_for_recipe(&self, recipe_id: Uuid) -> anyhow::Result<Vec<Rating>>;
}

#[async_trait]
impl RatingRepo for PgStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        rating: i32,
        review: Option<&str>,
    ) -> anyhow::Result<Rating> {
        let row = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM upsert_rating($1, $2, $3, $4)"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(rating)
        .bind(review)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn get(&self, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<Option<Rating>> {
        let row = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_for_recipe(&self, recipe_id: Uuid) -> anyhow::Result<Vec<Rating>> {
        let rows = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE recipe_id = $1 ORDER BY updated_at DESC, id"
        ))
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
