use async_trait::async_trait;
use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::RecipeFilters,
    repo_types::{Recipe, RecipeRow},
};
use crate::db::PgStore;

pub(crate) const RECIPE_COLUMNS: &str = "id, author_id, title, description, image_url, \
     prep_time_minutes, cook_time_minutes, servings, difficulty, calories, protein_g, carbs_g, \
     fat_g, ingredients, instructions, categories, tags, created_at, updated_at";

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    async fn list(&self, filters: &RecipeFilters) -> anyhow::Result<Vec<Recipe>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>>;
    async fn exists(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn insert(&self, recipe: &Recipe) -> anyhow::Result<Recipe>;
    /// Writes every mutable column; `None` when the row is gone.
    async fn update(&self, recipe: &Recipe) -> anyhow::Result<Option<Recipe>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl RecipeRepo for PgStore {
    async fn list(&self, filters: &RecipeFilters) -> anyhow::Result<Vec<Recipe>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE TRUE"));

        if let Some(term) = filters.search_term() {
            let pattern = like_pattern(term);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filters.category {
            qb.push(" AND EXISTS (SELECT 1 FROM unnest(categories) c WHERE lower(c) = lower(")
                .push_bind(category.clone())
                .push("))");
        }
        if let Some(tag) = &filters.tag {
            qb.push(" AND EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = lower(")
                .push_bind(tag.clone())
                .push("))");
        }
        if let Some(difficulty) = filters.difficulty {
            qb.push(" AND difficulty = ").push_bind(difficulty.as_str());
        }
        if let Some(max) = filters.max_total_time {
            qb.push(" AND COALESCE(prep_time_minutes, 0) + COALESCE(cook_time_minutes, 0) <= ")
                .push_bind(max);
        }
        if let Some(author) = filters.author_id {
            qb.push(" AND author_id = ").push_bind(author);
        }

        qb.push(" ORDER BY ")
            .push(filters.sort.order_by())
            .push(" LIMIT ")
            .push_bind(filters.limit())
            .push(" OFFSET ")
            .push_bind(filters.offset());

        let rows = qb.build_query_as::<RecipeRow>().fetch_all(&self.db).await?;
        rows.into_iter().map(Recipe::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn exists(&self, id: Uuid) -> anyhow::Result<bool> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(found)
    }

    async fn insert(&self, r: &Recipe) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            INSERT INTO recipes (id, author_id, title, description, image_url,
                                 prep_time_minutes, cook_time_minutes, servings, difficulty,
                                 calories, protein_g, carbs_g, fat_g,
                                 ingredients, instructions, categories, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(r.id)
        .bind(r.author_id)
        .bind(&r.title)
        .bind(&r.description)
        .bind(&r.image_url)
        .bind(r.prep_time_minutes)
        .bind(r.cook_time_minutes)
        .bind(r.servings)
        .bind(r.difficulty.as_str())
        .bind(r.macros.calories)
        .bind(r.macros.protein_g)
        .bind(r.macros.carbs_g)
        .bind(r.macros.fat_g)
        .bind(Json(&r.ingredients))
        .bind(&r.instructions)
        .bind(&r.categories)
        .bind(&r.tags)
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn update(&self, r: &Recipe) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            UPDATE recipes
               SET title = $2, description = $3, image_url = $4,
                   prep_time_minutes = $5, cook_time_minutes = $6, servings = $7,
                   difficulty = $8, calories = $9, protein_g = $10, carbs_g = $11, fat_g = $12,
                   ingredients = $13, instructions = $14, categories = $15, tags = $16,
                   updated_at = now()
             WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(r.id)
        .bind(&r.title)
        .bind(&r.description)
        .bind(&r.image_url)
        .bind(r.prep_time_minutes)
        .bind(r.cook_time_minutes)
        .bind(r.servings)
        .bind(r.difficulty.as_str())
        .bind(r.macros.calories)
        .bind(r.macros.protein_g)
        .bind(r.macros.carbs_g)
        .bind(r.macros.fat_g)
        .bind(Json(&r.ingredients))
        .bind(&r.instructions)
        .bind(&r.categories)
        .bind(&r.tags)
        .fetch_optional(&self.db)
        .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pasta"), "%pasta%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
    }
}
